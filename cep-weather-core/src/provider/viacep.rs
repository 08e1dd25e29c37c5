use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};

use crate::{
    error::ClientError,
    model::{PostalAddress, Reply},
    scope::RequestScope,
};

use super::{PostalLookup, success_body};

const VIACEP_BASE: &str = "https://viacep.com.br";

/// ViaCEP postal lookup. No credentials required.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    http: Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: VIACEP_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    async fn fetch(&self, cep: &str) -> Result<Reply<Option<PostalAddress>>, ClientError> {
        let url = format!("{}/ws/{}/json/", self.base_url, cep);

        let res = self.http.get(&url).send().await?;
        let (status, body) = success_body(res).await?;

        let parsed: Option<VcAddress> = serde_json::from_str(&body)?;

        Ok(Reply::new(status, parsed.map(PostalAddress::from)))
    }
}

#[derive(Debug, Deserialize)]
struct VcAddress {
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    erro: bool,
}

impl From<VcAddress> for PostalAddress {
    fn from(a: VcAddress) -> Self {
        PostalAddress {
            locality: a.localidade,
            state: a.uf,
            not_found: a.erro,
        }
    }
}

/// ViaCEP reports a miss as `"erro": true` or `"erro": "true"`.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s.eq_ignore_ascii_case("true"),
    })
}

#[async_trait]
impl PostalLookup for ViaCepClient {
    async fn lookup(
        &self,
        cep: &str,
        scope: &RequestScope,
    ) -> Result<Reply<Option<PostalAddress>>, ClientError> {
        scope.run(self.fetch(cep)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scope() -> RequestScope {
        RequestScope::derive(None, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ws/01153000/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cep": "01153-000",
                "logradouro": "Rua Vitorino Carmilo",
                "bairro": "Barra Funda",
                "localidade": "São Paulo",
                "uf": "SP"
            })))
            .mount(&mock_server)
            .await;

        let client = ViaCepClient::new(Client::new()).with_base_url(&mock_server.uri());
        let reply = client.lookup("01153000", &scope()).await.unwrap();

        assert_eq!(reply.status, 200);
        let addr = reply.value.unwrap();
        assert_eq!(addr.locality, "São Paulo");
        assert_eq!(addr.state, "SP");
        assert!(!addr.not_found);
    }

    #[tokio::test]
    async fn test_lookup_not_found_flag() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ws/99999999/json/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "erro": true })),
            )
            .mount(&mock_server)
            .await;

        let client = ViaCepClient::new(Client::new()).with_base_url(&mock_server.uri());
        let reply = client.lookup("99999999", &scope()).await.unwrap();

        assert!(reply.value.unwrap().not_found);
    }

    #[tokio::test]
    async fn test_lookup_not_found_flag_as_string() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ws/99999999/json/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "erro": "true" })),
            )
            .mount(&mock_server)
            .await;

        let client = ViaCepClient::new(Client::new()).with_base_url(&mock_server.uri());
        let reply = client.lookup("99999999", &scope()).await.unwrap();

        assert!(reply.value.unwrap().not_found);
    }

    #[tokio::test]
    async fn test_lookup_bad_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("<html>Bad Request</html>"))
            .mount(&mock_server)
            .await;

        let client = ViaCepClient::new(Client::new()).with_base_url(&mock_server.uri());
        let result = client.lookup("01153000", &scope()).await;

        assert!(matches!(result, Err(ClientError::Status { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_lookup_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = ViaCepClient::new(Client::new()).with_base_url(&mock_server.uri());
        let result = client.lookup("01153000", &scope()).await;

        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[tokio::test]
    async fn test_lookup_times_out_with_scope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "localidade": "São Paulo", "uf": "SP" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let client = ViaCepClient::new(Client::new()).with_base_url(&mock_server.uri());
        let scope = RequestScope::derive(None, Duration::from_millis(100));
        let result = client.lookup("01153000", &scope).await;

        assert!(matches!(
            result,
            Err(ClientError::Scope(crate::scope::ScopeError::DeadlineExceeded))
        ));
    }
}

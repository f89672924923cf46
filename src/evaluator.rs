//! An HTTP client that requests treatments from a Split Evaluator service.
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use reqwest::{header::AUTHORIZATION, StatusCode, Url};
use serde::Deserialize;

use crate::{client::CONTROL_TREATMENT, Attributes, Error, Result};

const TREATMENT_ENDPOINT: &str = "/client/get-treatment";

/// Body of a `get-treatment` response: `{"splitName": "...", "treatment": "..."}`.
#[derive(Debug, Deserialize)]
struct TreatmentResponse {
    treatment: String,
}

pub(crate) struct EvaluatorClient {
    // Client holds a connection pool internally, so we're reusing the client between requests.
    client: reqwest::blocking::Client,
    url: Url,
    auth_token: String,
    /// If we receive a 401 Unauthorized error during a request, it means the SDK key is not
    /// valid. We cache this error so we don't issue additional requests to the server.
    unauthorized: AtomicBool,
}

impl EvaluatorClient {
    pub(crate) fn new(
        base_url: &str,
        auth_token: String,
        timeout: Duration,
    ) -> Result<EvaluatorClient> {
        let url = Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), TREATMENT_ENDPOINT))
            .map_err(Error::InvalidBaseUrl)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(EvaluatorClient {
            client,
            url,
            auth_token,
            unauthorized: AtomicBool::new(false),
        })
    }

    fn treatment_url(&self, key: &str, feature_name: &str, attributes: Option<&Attributes>) -> Url {
        let mut url = self.url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", key);
            query.append_pair("split-name", feature_name);
            if let Some(attributes) = attributes {
                // Serializing a string-keyed map of untagged values cannot fail.
                if let Ok(attributes) = serde_json::to_string(attributes) {
                    query.append_pair("attributes", &attributes);
                }
            }
        }
        url
    }

    /// Request a treatment. Every failure is reported as control.
    pub(crate) fn treatment(
        &self,
        key: &str,
        feature_name: &str,
        attributes: Option<&Attributes>,
    ) -> String {
        if self.unauthorized.load(Ordering::Relaxed) {
            return CONTROL_TREATMENT.to_owned();
        }

        match self.fetch_treatment(key, feature_name, attributes) {
            Ok(treatment) => treatment,
            Err(err) => {
                log::warn!(target: "split",
                           feature_name,
                           key;
                           "failed to fetch treatment from evaluator: {:?}", err);
                CONTROL_TREATMENT.to_owned()
            }
        }
    }

    fn fetch_treatment(
        &self,
        key: &str,
        feature_name: &str,
        attributes: Option<&Attributes>,
    ) -> std::result::Result<String, reqwest::Error> {
        let url = self.treatment_url(key, feature_name, attributes);

        log::trace!(target: "split", feature_name, key; "requesting treatment");
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, &self.auth_token)
            .send()?;

        let response = response.error_for_status().map_err(|err| {
            if err.status() == Some(StatusCode::UNAUTHORIZED) {
                log::warn!(target: "split", "evaluator rejected the request. Check your SDK key");
                self.unauthorized.store(true, Ordering::Relaxed);
            }
            err
        })?;

        let response: TreatmentResponse = response.json()?;

        Ok(response.treatment)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use mockito::Matcher;

    use super::{EvaluatorClient, TREATMENT_ENDPOINT};

    fn client(base_url: &str) -> EvaluatorClient {
        EvaluatorClient::new(base_url, "sdk-key".to_owned(), Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn builds_treatment_url_without_attributes() {
        let url = client("http://evaluator:7548/").treatment_url("user-1", "new-checkout", None);

        assert_eq!(
            url.as_str(),
            "http://evaluator:7548/client/get-treatment?key=user-1&split-name=new-checkout"
        );
    }

    #[test]
    fn builds_treatment_url_with_attributes() {
        let attributes = HashMap::from([("plan".to_owned(), "pro".into())]);
        let url = client("http://evaluator:7548").treatment_url("user-1", "flag", Some(&attributes));

        let attributes_param = url
            .query_pairs()
            .find(|(name, _)| name == "attributes")
            .map(|(_, value)| value.into_owned());
        assert_eq!(attributes_param.as_deref(), Some(r#"{"plan":"pro"}"#));
    }

    #[test]
    fn unreachable_evaluator_serves_control() {
        let client = client("http://127.0.0.1:1");

        assert_eq!(client.treatment("user-1", "flag", None), "control");
    }

    #[test]
    fn fetches_treatment_with_sdk_key() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", TREATMENT_ENDPOINT)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".to_owned(), "user 1".to_owned()),
                Matcher::UrlEncoded("split-name".to_owned(), "flag".to_owned()),
            ]))
            .match_header("authorization", "sdk-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"splitName": "flag", "treatment": "on"}"#)
            .expect(1)
            .create();

        let treatment = client(&server.url()).treatment("user 1", "flag", None);

        assert_eq!(treatment, "on");
        mock.assert();
    }

    #[test]
    fn unexpected_response_serves_control() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", TREATMENT_ENDPOINT)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create();

        assert_eq!(
            client(&server.url()).treatment("user-1", "flag", None),
            "control"
        );
    }

    #[test]
    fn unauthorized_response_stops_further_requests() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", TREATMENT_ENDPOINT)
            .match_query(Matcher::Any)
            .with_status(401)
            .expect(1)
            .create();

        let client = client(&server.url());

        assert_eq!(client.treatment("user-1", "flag", None), "control");
        assert_eq!(client.treatment("user-1", "flag", None), "control");
        mock.assert();
    }
}

//! Request routing
//!
//! Two routes exist: `/` serves a fixed HTML greeting and
//! `/greet/{npm}[?name=X]` serves a student greeting as JSON or XML.
//! Everything else is answered with a bare `404`.

use super::{HttpRequest, HttpResponse, Negotiator, Result};
use serde::{Deserialize, Serialize};

/// Path prefix of the greeting route
pub const GREET_PREFIX: &str = "/greet/";

/// Identity of the student served by the greeting route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Student {
    pub nama: String,
    pub npm: String,
}

/// Payload of the greeting route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GreetResponse {
    pub student: Student,
    pub greeter: String,
}

impl GreetResponse {
    /// Serialize to the JSON form
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Serialize to the XML form
    pub fn to_xml(&self) -> Vec<u8> {
        format!(
            "<GreetResponse><Student><Nama>{}</Nama><Npm>{}</Npm></Student><Greeter>{}</Greeter></GreetResponse>",
            escape_xml(&self.student.nama),
            escape_xml(&self.student.npm),
            escape_xml(&self.greeter),
        )
        .into_bytes()
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// What the routes serve
#[derive(Debug, Clone)]
pub struct GreetConfig {
    pub student_name: String,
    pub student_npm: String,
    /// HTML body of `/`
    pub greeting: String,
}

impl Default for GreetConfig {
    fn default() -> Self {
        GreetConfig {
            student_name: "Firaz".to_string(),
            student_npm: "2306217481".to_string(),
            greeting: "<html><body><h1>Halo, dunia! Aku Firaz sedang mengerjakan A03</h1></body></html>"
                .to_string(),
        }
    }
}

/// Maps requests to responses
///
/// Successful responses go through content-encoding negotiation, `404`s do
/// not.
#[derive(Debug, Clone, Default)]
pub struct Router {
    config: GreetConfig,
    negotiator: Negotiator,
}

impl Router {
    /// Create a router
    pub fn new(config: GreetConfig, negotiator: Negotiator) -> Self {
        Router { config, negotiator }
    }

    /// Produce the response for `request`
    pub fn handle(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let uri = request.uri();

        let mut response = if uri == "/" {
            HttpResponse::builder()
                .content_type("text/html")
                .data(self.config.greeting.as_bytes().to_vec())
                .build()
        } else if uri.starts_with(GREET_PREFIX) {
            match self.greet(request)? {
                Some(response) => response,
                None => return Ok(HttpResponse::not_found()),
            }
        } else {
            tracing::debug!(uri, "no route");
            return Ok(HttpResponse::not_found());
        };

        self.negotiator.apply(request.accept_encoding(), &mut response)?;
        Ok(response)
    }

    fn greet(&self, request: &HttpRequest) -> Result<Option<HttpResponse>> {
        let (path, query) = match request.uri().split_once('?') {
            Some((path, query)) => (path, query),
            None => (request.uri(), ""),
        };

        // "/greet/{npm}" splits into ["", "greet", "{npm}", ...]
        let npm = path.split('/').nth(2).unwrap_or_default();
        if npm != self.config.student_npm {
            tracing::debug!(npm, "unknown student");
            return Ok(None);
        }

        let greeter = query
            .split('&')
            .filter_map(|pair| pair.strip_prefix("name="))
            .find(|name| !name.is_empty())
            .unwrap_or(&self.config.student_name);

        let greet = GreetResponse {
            student: Student {
                nama: self.config.student_name.clone(),
                npm: self.config.student_npm.clone(),
            },
            greeter: greeter.to_string(),
        };

        let response = if request.accept() == "application/xml" {
            HttpResponse::builder()
                .content_type("application/xml")
                .data(greet.to_xml())
                .build()
        } else {
            HttpResponse::builder()
                .content_type("application/json")
                .data(greet.to_json()?)
                .build()
        };

        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::encoding::resolve;

    fn get(uri: &str, accept: &str) -> HttpRequest {
        HttpRequest::builder()
            .uri(uri)
            .host("localhost:7481")
            .accept(accept)
            .build()
    }

    #[test]
    fn test_root() {
        let resp = Router::default().handle(&get("/", "text/html")).unwrap();

        assert_eq!(resp.status(), "200");
        assert_eq!(resp.content_type(), "text/html");
        assert_eq!(resp.content_encoding(), "");
        let body = String::from_utf8(resp.data().to_vec()).unwrap();
        assert!(body.contains("Halo, dunia!"));
    }

    #[test]
    fn test_greet_xml() {
        let resp = Router::default()
            .handle(&get("/greet/2306217481", "application/xml"))
            .unwrap();

        assert_eq!(resp.status(), "200");
        assert_eq!(resp.content_type(), "application/xml");
        let body = String::from_utf8(resp.data().to_vec()).unwrap();
        assert!(body.contains("<Nama>Firaz</Nama>"));
        assert!(body.contains("<Npm>2306217481</Npm>"));
        assert!(body.contains("<Greeter>Firaz</Greeter>"));
    }

    #[test]
    fn test_greet_json_with_name() {
        let resp = Router::default()
            .handle(&get("/greet/2306217481?name=Budi", ""))
            .unwrap();

        assert_eq!(resp.content_type(), "application/json");
        assert_eq!(
            resp.data(),
            br#"{"Student":{"Nama":"Firaz","Npm":"2306217481"},"Greeter":"Budi"}"#
        );
    }

    #[test]
    fn test_greet_empty_name_keeps_default() {
        let resp = Router::default()
            .handle(&get("/greet/2306217481?name=", "application/json"))
            .unwrap();

        let greet: GreetResponse = serde_json::from_slice(resp.data()).unwrap();
        assert_eq!(greet.greeter, "Firaz");
    }

    #[test]
    fn test_greet_name_among_other_params() {
        let resp = Router::default()
            .handle(&get("/greet/2306217481?lang=id&name=Sari", "application/json"))
            .unwrap();

        let greet: GreetResponse = serde_json::from_slice(resp.data()).unwrap();
        assert_eq!(greet.greeter, "Sari");
        assert_eq!(greet.student.nama, "Firaz");
    }

    #[test]
    fn test_greet_wrong_npm() {
        let resp = Router::default()
            .handle(&get("/greet/0000000000", "application/json"))
            .unwrap();

        assert_eq!(resp, HttpResponse::not_found());
        assert_eq!(resp.to_wire(), b"HTTP/1.1 404\r\n\r\n");
    }

    #[test]
    fn test_greet_missing_npm() {
        let resp = Router::default().handle(&get("/greet/", "")).unwrap();
        assert_eq!(resp.status(), "404");
    }

    #[test]
    fn test_unknown_route() {
        let resp = Router::default().handle(&get("/unknown", "")).unwrap();

        assert_eq!(resp.status(), "404");
        assert_eq!(resp.version(), "HTTP/1.1");
        assert!(resp.data().is_empty());
        assert_eq!(resp.content_type(), "");
    }

    #[test]
    fn test_greet_is_negotiated() {
        let request = HttpRequest::builder()
            .uri("/greet/2306217481")
            .accept("application/xml")
            .accept_encoding("deflate")
            .build();

        let resp = Router::default().handle(&request).unwrap();
        assert_eq!(resp.content_encoding(), "deflate");
        assert_eq!(resp.content_length(), resp.data().len());

        let body = resolve("deflate", resp.data().to_vec());
        assert!(String::from_utf8(body).unwrap().contains("<Greeter>Firaz</Greeter>"));
    }

    #[test]
    fn test_configured_student() {
        let config = GreetConfig {
            student_name: "Ani".to_string(),
            student_npm: "42".to_string(),
            greeting: "<p>hi</p>".to_string(),
        };
        let router = Router::new(config, Negotiator::default());

        let resp = router.handle(&get("/greet/42", "")).unwrap();
        assert_eq!(
            resp.data(),
            br#"{"Student":{"Nama":"Ani","Npm":"42"},"Greeter":"Ani"}"#
        );

        let resp = router.handle(&get("/", "")).unwrap();
        assert_eq!(resp.data(), b"<p>hi</p>");

        let resp = router.handle(&get("/greet/2306217481", "")).unwrap();
        assert_eq!(resp.status(), "404");
    }

    #[test]
    fn test_xml_escaping() {
        let greet = GreetResponse {
            student: Student {
                nama: "A&B".to_string(),
                npm: "1".to_string(),
            },
            greeter: "<x>".to_string(),
        };
        let xml = String::from_utf8(greet.to_xml()).unwrap();
        assert!(xml.contains("<Nama>A&amp;B</Nama>"));
        assert!(xml.contains("<Greeter>&lt;x&gt;</Greeter>"));
    }
}

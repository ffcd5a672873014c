//! Server and client configuration
//!
//! The server reads an optional TOML file; every key has a default so an
//! empty file (or no file) gives the stock greeting server. Command-line
//! flags override the file.

use crate::http::encoding::DEFAULT_DEFLATE_LEVEL;
use crate::http::{GreetConfig, Negotiator, Router, DEFAULT_MAX_MESSAGE_BYTES, NO_ENCODING};
use serde::Deserialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub student_name: String,
    pub student_npm: String,
    /// HTML body served on `/`
    pub greeting: String,
    /// Compression level for `deflate`, 0-9
    pub deflate_level: u32,
    pub max_message_bytes: usize,
    /// Unset means no limit
    pub max_connections: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let greet = GreetConfig::default();
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 7481,
            student_name: greet.student_name,
            student_npm: greet.student_npm,
            greeting: greet.greeting,
            deflate_level: DEFAULT_DEFLATE_LEVEL,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            max_connections: None,
        }
    }
}

impl ServerConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deflate_level > 9 {
            return Err(ConfigError::Invalid(format!(
                "deflate_level must be 0-9, got {}",
                self.deflate_level
            )));
        }
        if self.student_npm.is_empty() || self.student_npm.contains(['/', '?']) {
            return Err(ConfigError::Invalid(format!(
                "student_npm must be a single path segment, got {:?}",
                self.student_npm
            )));
        }
        if self.max_message_bytes == 0 {
            return Err(ConfigError::Invalid("max_message_bytes must be positive".to_string()));
        }
        if self.max_connections == Some(0) {
            return Err(ConfigError::Invalid("max_connections must be positive".to_string()));
        }
        Ok(())
    }

    /// Build the router these settings describe
    pub fn router(&self) -> Router {
        let greet = GreetConfig {
            student_name: self.student_name.clone(),
            student_npm: self.student_npm.clone(),
            greeting: self.greeting.clone(),
        };
        Router::new(greet, Negotiator::new(self.deflate_level))
    }
}

/// Load and validate server configuration from a TOML file
pub fn load_server_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_server_config(&content)
}

/// Parse and validate server configuration from TOML text
pub fn parse_server_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// What the client sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: String,
    pub accept: String,
    pub accept_encoding: String,
}

impl ClientConfig {
    /// Fill in missing values by prompting on `output` and reading `input`
    ///
    /// Each prompt reads one line. An empty Accept-Encoding answer means
    /// `none`.
    pub fn complete<R: BufRead, W: Write>(
        url: Option<String>,
        accept: Option<String>,
        accept_encoding: Option<String>,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<Self> {
        let url = match url {
            Some(url) => url,
            None => prompt(input, output, "Input URL: ")?,
        };
        let accept = match accept {
            Some(accept) => accept,
            None => prompt(input, output, "Input Content Type: ")?,
        };
        let accept_encoding = match accept_encoding {
            Some(accept_encoding) => accept_encoding,
            None => prompt(
                input,
                output,
                "Input Accept Encoding (write \"none\" if no special encoding can be accepted): ",
            )?,
        };

        Ok(ClientConfig {
            url,
            accept,
            accept_encoding: if accept_encoding.is_empty() {
                NO_ENCODING.to_string()
            } else {
                accept_encoding
            },
        })
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<String> {
    output.write_all(label.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no input"));
    }
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpRequest;
    use std::io::Cursor;

    #[test]
    fn test_defaults() {
        let config = parse_server_config("").unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 7481);
        assert_eq!(config.student_npm, "2306217481");
        assert_eq!(config.deflate_level, 6);
        assert_eq!(config.max_connections, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 9000
student_name = "Ani"
student_npm = "1234"
deflate_level = 9
max_connections = 16
"#
        )
        .unwrap();

        let config = load_server_config(file.path()).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_connections, Some(16));

        let request = HttpRequest::builder().uri("/greet/1234").build();
        let response = config.router().handle(&request).unwrap();
        assert_eq!(
            response.data(),
            br#"{"Student":{"Nama":"Ani","Npm":"1234"},"Greeter":"Ani"}"#
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse_server_config("deflate_level = 12"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse_server_config(r#"student_npm = "a/b""#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse_server_config("max_connections = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_server_config("port = \"high\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            parse_server_config("colour = 1"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            load_server_config(Path::new("/nonexistent/greet.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_client_config_prompts_for_missing() {
        let mut input = Cursor::new("http://localhost:7481/\n\n");
        let mut output = Vec::new();

        let config = ClientConfig::complete(
            None,
            Some("text/html".to_string()),
            None,
            &mut input,
            &mut output,
        )
        .unwrap();

        assert_eq!(config.url, "http://localhost:7481/");
        assert_eq!(config.accept, "text/html");
        assert_eq!(config.accept_encoding, "none");

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.starts_with("Input URL: "));
        assert!(!shown.contains("Input Content Type"));
    }

    #[test]
    fn test_client_config_eof() {
        let result = ClientConfig::complete(None, None, None, &mut Cursor::new(""), &mut Vec::new());
        assert!(result.is_err());
    }
}

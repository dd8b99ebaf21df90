use crate::error::SourceError;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

/// Where raw log text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    Stdin,
    File(PathBuf),
    /// `GET {server}/{name}`
    Remote { server: String, name: String },
}

impl LogSource {
    pub fn name(&self) -> String {
        match self {
            LogSource::Stdin => "stdin".to_string(),
            LogSource::File(path) => path.display().to_string(),
            LogSource::Remote { .. } => self.remote_url().unwrap_or_default(),
        }
    }

    fn remote_url(&self) -> Option<String> {
        match self {
            LogSource::Remote { server, name } => Some(format!(
                "{}/{}",
                server.trim_end_matches('/'),
                name.trim_start_matches('/')
            )),
            _ => None,
        }
    }

    /// Read the whole log. Remote sources go through `client`, which carries the
    /// request timeout.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
    /// failing the read, so a damaged line only affects itself.
    pub async fn read_to_string(&self, client: &reqwest::Client) -> Result<String, SourceError> {
        let read = |source| SourceError::Read {
            name: self.name(),
            source,
        };

        match self {
            LogSource::Stdin => {
                let mut bytes = Vec::new();
                tokio::io::stdin()
                    .read_to_end(&mut bytes)
                    .await
                    .map_err(read)?;
                Ok(decode_lossy(bytes))
            }

            LogSource::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(read)?;
                Ok(decode_lossy(bytes))
            }

            LogSource::Remote { server, .. } => {
                if server.is_empty() {
                    return Err(SourceError::NoServer);
                }
                let url = self.remote_url().unwrap_or_default();
                tracing::info!(%url, "fetching remote log");

                let fetch = |source| SourceError::Fetch {
                    url: url.clone(),
                    source,
                };

                client
                    .get(&url)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(fetch)?
                    .text()
                    .await
                    .map_err(fetch)
            }
        }
    }
}

fn decode_lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("log contains invalid UTF-8, damaged bytes replaced");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{LogFormat, LogParser};
    use std::collections::HashSet;
    use std::io::Write;

    #[test]
    fn remote_url_joins_without_double_slashes() {
        let source = LogSource::Remote {
            server: "http://logs.example.com/logs/".into(),
            name: "/access.log".into(),
        };
        assert_eq!(source.name(), "http://logs.example.com/logs/access.log");
    }

    #[tokio::test]
    async fn file_source_reads_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "line one").unwrap();
        writeln!(file, "line two").unwrap();

        let source = LogSource::File(file.path().to_path_buf());
        let text = source.read_to_string(&reqwest::Client::new()).await.unwrap();

        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["line one", "line two"]);
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_fail_the_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"1.2.3.4 - - [22/Nov/2017:18:47:58 +0000] \"GET / HTTP/1.1\" 200 512\n\
              5.6.7.8 - - [22/Nov/2017:18:48:00 +0000] \"GET /\xff HTTP/1.1\" 404 0\n\
              9.9.9.9 - - [22/Nov/2017:18:49:00 +0000] \"GET /ok HTTP/1.1\" 200 10\n",
        )
        .unwrap();

        let source = LogSource::File(file.path().to_path_buf());
        let text = source.read_to_string(&reqwest::Client::new()).await.unwrap();

        let entries = LogParser::new(LogFormat::Access, HashSet::new()).parse_lines(text.lines());
        let addresses: Vec<_> = entries.iter().map(|e| e.address.as_str()).collect();
        assert_eq!(addresses, vec!["1.2.3.4", "5.6.7.8", "9.9.9.9"]);
        assert_eq!(entries[1].text, "GET /\u{FFFD} HTTP/1.1");
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let source = LogSource::File("/definitely/not/here.log".into());
        let err = source
            .read_to_string(&reqwest::Client::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::Read { .. }));
    }

    #[tokio::test]
    async fn remote_without_server_is_rejected() {
        let source = LogSource::Remote {
            server: String::new(),
            name: "access.log".into(),
        };
        let err = source
            .read_to_string(&reqwest::Client::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SourceError::NoServer));
    }
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::config::Config;
use crate::http::docroot::DocumentRoot;
use crate::http::framer::DEFAULT_CHUNK_SIZE;
use crate::server::control::Maintenance;

/// Default file that POST appends to instead of copying.
pub const DEFAULT_APPEND_TARGET: &str = "/post/post-test.txt";

/// Default value of the `Server` header.
pub const DEFAULT_SERVER_NAME: &str = "docroot";

/// Everything a connection needs, handed to each worker.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub root: DocumentRoot,
    pub maintenance: Maintenance,
    pub server_name: String,
    /// Resolved absolute path of the POST append target.
    pub append_target: PathBuf,
    pub read_timeout: Option<Duration>,
    pub read_buffer_size: usize,
    pub dump_messages: bool,
}

impl ServerContext {
    /// Context with default settings, for embedding and tests.
    pub fn new(root: DocumentRoot, maintenance: Maintenance) -> Self {
        let append_target = root
            .resolve(DEFAULT_APPEND_TARGET)
            .unwrap_or_else(|| root.path().join("post").join("post-test.txt"));

        Self {
            root,
            maintenance,
            server_name: DEFAULT_SERVER_NAME.to_string(),
            append_target,
            read_timeout: None,
            read_buffer_size: DEFAULT_CHUNK_SIZE,
            dump_messages: false,
        }
    }

    pub fn from_config(cfg: &Config, root: DocumentRoot, maintenance: Maintenance) -> anyhow::Result<Self> {
        let append_target = root
            .resolve(&cfg.documents.append_target)
            .with_context(|| format!("append target {} escapes the document root", cfg.documents.append_target))?;

        Ok(Self {
            root,
            maintenance,
            server_name: cfg.documents.server_name.clone(),
            append_target,
            read_timeout: cfg.server.read_timeout(),
            read_buffer_size: cfg.server.read_buffer_size,
            dump_messages: cfg.logging.dump_messages,
        })
    }
}

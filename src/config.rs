//! Server configuration.
//!
//! Every option can come from a flag or from the environment; the
//! defaults reproduce the fixed deployment: all interfaces, port 8080,
//! model under `model/lstm_model.onnx`.

use crate::predictor::{self, DEFAULT_MODEL_PATH};
use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Serve an LSTM forecasting model over HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "forecast-serve")]
#[command(version, about, long_about = None)]
pub struct ServeConfig {
    /// Interface to listen on
    #[arg(long, env = "FORECAST_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "FORECAST_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Path to the ONNX model artifact
    #[arg(short, long, env = "FORECAST_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Threads used inside a single forward pass
    #[arg(long, env = "FORECAST_INTRA_THREADS", default_value_t = 1)]
    pub intra_threads: usize,

    /// Use basic graph optimization only
    #[arg(long)]
    pub no_optimize: bool,

    /// Verbosity level (-v, -vv); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl ServeConfig {
    /// Address the listener binds to.
    pub fn socket_addr(&self) -> crate::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    /// Settings for loading the model.
    pub fn predictor_config(&self) -> predictor::Config {
        predictor::Config {
            model_path: self.model.clone(),
            optimize_graph: !self.no_optimize,
            intra_threads: self.intra_threads,
        }
    }

    /// Log filter: `-v` flags win over `RUST_LOG`, which wins over `info`.
    pub fn log_filter(&self) -> EnvFilter {
        match self.verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

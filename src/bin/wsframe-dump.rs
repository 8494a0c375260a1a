//! wsframe-dump: reference parser-under-test.
//!
//! Reads a raw WebSocket frame stream on stdin and prints one transcript line
//! per completed message on stdout.
//!
//! Exit codes: 0 clean stream, 1 protocol error or truncated input,
//! 2 I/O failure.
#![deny(unused_must_use)]

use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use wsframe::config::DumpConfig;
use wsframe::transcript::{Session, StreamStatus};

#[derive(Parser, Debug)]
#[command(name = "wsframe-dump", version)]
#[command(about = "Decode a WebSocket frame stream from stdin into a transcript")]
struct Args {
    /// Largest data message buffered before failing with message_too_large
    #[arg(long, value_name = "BYTES")]
    max_message: Option<usize>,

    /// Bytes per stdin read
    #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u32).range(1..))]
    read_size: Option<u32>,
}

impl Args {
    fn config(&self) -> DumpConfig {
        let mut config = DumpConfig::default();
        if let Some(max) = self.max_message {
            config.max_message = max;
        }
        if let Some(size) = self.read_size {
            config.read_size = size as usize;
        }
        config
    }
}

fn dump(config: &DumpConfig) -> Result<StreamStatus> {
    let mut stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    let mut session = Session::new(stdout, config);
    let mut buf = vec![0u8; config.read_size];
    let mut total = 0usize;

    loop {
        let n = match stdin.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("failed to read stdin"),
        };
        total += n;
        debug!("read {} bytes", n);
        session
            .feed(&mut buf[..n])
            .context("failed to write transcript")?;
    }

    let (mut out, status) = session.finish().context("failed to write transcript")?;
    out.flush().context("failed to write transcript")?;
    debug!("{} bytes in, stream {:?}", total, status);
    Ok(status)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match dump(&args.config()) {
        Ok(status) => ExitCode::from(status.exit_code() as u8),
        Err(e) => {
            eprintln!("wsframe-dump: {e:#}");
            ExitCode::from(2)
        }
    }
}

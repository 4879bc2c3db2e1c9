use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result, bail};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next();
    if args.next().is_some() {
        bail!("Usage: puffin [file]");
    }

    let source = if let Some(path) = &input_path {
        fs::read_to_string(path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    puffin::run_program(&source, &mut out)?;
    out.flush()?;
    Ok(())
}

//! `encode`/`decode` subcommands over the `yuvcodec::Codec` API.
//!
//! Grounded on the `ffv1-decoder` binary's input/output CLI shape, ported
//! from `clap::App`/`Arg` to the derive-style `clap::Parser`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use yuvcodec::Codec;

#[derive(Parser)]
#[clap(name = "yuvcodec-cli", about = "Hybrid intra/inter YUV codec")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encodes a raw YUV file into a compressed stream.
    Encode {
        #[clap(short, long)]
        input: PathBuf,
        #[clap(short, long)]
        output: PathBuf,
        /// Golomb divisor M (power of two).
        #[clap(short = 'm', long)]
        golomb_m: u32,
        /// Block size B.
        #[clap(short, long)]
        block_size: usize,
        /// Motion search window S (in blocks).
        #[clap(short, long)]
        search: usize,
        /// Per-component quantization step, "qY:qU:qV". Omit for lossless.
        #[clap(long)]
        quant: Option<String>,
        #[clap(long)]
        limit_frames: Option<usize>,
    },
    /// Decodes a compressed stream back into a raw YUV file.
    Decode {
        #[clap(short, long)]
        input: PathBuf,
        #[clap(short, long)]
        output: PathBuf,
        #[clap(long)]
        limit_frames: Option<usize>,
    },
}

fn parse_quant(s: &str) -> Result<(u8, u8, u8), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("expected qY:qU:qV, got {:?}", s));
    }
    let parse_one = |p: &str| p.parse::<u8>().map_err(|e| e.to_string());
    Ok((parse_one(parts[0])?, parse_one(parts[1])?, parse_one(parts[2])?))
}

fn run(cli: Cli) -> yuvcodec::Result<()> {
    match cli.command {
        Command::Encode {
            input,
            output,
            golomb_m,
            block_size,
            search,
            quant,
            limit_frames,
        } => {
            let codec = Codec::open_raw(&input, limit_frames)?;
            let q = quant
                .as_deref()
                .map(|s| parse_quant(s).map_err(yuvcodec::Error::HeaderMalformed))
                .transpose()?;
            log::info!("encoding {} frame(s) to {:?}", codec.frames().len(), output);
            codec.encode_to(&output, golomb_m, block_size, search, q)
        }
        Command::Decode {
            input,
            output,
            limit_frames,
        } => {
            let codec = Codec::open_encoded(&input, limit_frames)?;
            log::info!("decoded {} frame(s), writing to {:?}", codec.frames().len(), output);
            let header = yuvcodec::RawHeader {
                width: codec.width as u32,
                height: codec.height as u32,
                fps: codec.fps,
                colorspace: codec.color_space,
            };
            yuvcodec::rawio::write_raw_video(&output, header, codec.frames())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("yuvcodec-cli: {}", err);
            ExitCode::FAILURE
        }
    }
}

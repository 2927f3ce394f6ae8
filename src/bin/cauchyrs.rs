//! cauchyrs - demonstration CLI for the cauchy_rs erasure engine
//!
//! Splits a file into fixed-size blocks, encodes recovery blocks for it, and
//! reconstructs the file from any `original_count` of the resulting blocks.
//! This binary is a manual-testing harness for the library, not a wire
//! format or a file-repair tool: the on-disk layout it uses (one file per
//! block plus a small metadata sidecar) is local to this binary.

use anyhow::{bail, ensure, Context, Result};
use cauchy_rs::{decode, encode, DecodeBlock, EncoderParams, GfContext};
use clap::{Arg, Command};
use std::fs;
use std::path::{Path, PathBuf};

const META_FILE: &str = "meta.txt";

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = Command::new("cauchyrs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Cauchy Reed-Solomon erasure coding over GF(256)")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("encode")
                .about("Split a file into blocks and write recovery blocks alongside them")
                .arg(Arg::new("input").help("File to protect").required(true).index(1))
                .arg(
                    Arg::new("out_dir")
                        .short('o')
                        .long("out-dir")
                        .help("Directory to write block.N files and metadata into")
                        .value_name("DIR")
                        .required(true),
                )
                .arg(
                    Arg::new("block_size")
                        .short('b')
                        .long("block-size")
                        .help("Bytes per block")
                        .value_name("BYTES")
                        .default_value("65536"),
                )
                .arg(
                    Arg::new("recovery_count")
                        .short('r')
                        .long("recovery-count")
                        .help("Number of recovery blocks to generate")
                        .value_name("COUNT")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("decode")
                .about("Reconstruct the original file from a directory of present blocks")
                .arg(
                    Arg::new("block_dir")
                        .help("Directory containing block.N files and metadata")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Path to write the reconstructed file to")
                        .value_name("FILE")
                        .required(true),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("encode", sub)) => handle_encode(sub),
        Some(("decode", sub)) => handle_decode(sub),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn handle_encode(matches: &clap::ArgMatches) -> Result<()> {
    let input = matches.get_one::<String>("input").expect("input is required");
    let out_dir = matches.get_one::<String>("out_dir").expect("out_dir is required");
    let block_size: usize = matches
        .get_one::<String>("block_size")
        .expect("has default")
        .parse()
        .context("--block-size must be a positive integer")?;
    let recovery_count: usize = matches
        .get_one::<String>("recovery_count")
        .expect("recovery_count is required")
        .parse()
        .context("--recovery-count must be a non-negative integer")?;

    let data = fs::read(input).with_context(|| format!("failed to read {input}"))?;
    ensure!(!data.is_empty(), "{} is empty; nothing to encode", input);
    ensure!(block_size > 0, "--block-size must be greater than zero");

    let original_count = data.len().div_ceil(block_size);
    ensure!(
        original_count + recovery_count <= 256,
        "original_count ({original_count}) + recovery_count ({recovery_count}) exceeds 256"
    );

    let mut originals: Vec<Vec<u8>> = Vec::with_capacity(original_count);
    for chunk in data.chunks(block_size) {
        let mut block = vec![0u8; block_size];
        block[..chunk.len()].copy_from_slice(chunk);
        originals.push(block);
    }

    let out_dir = PathBuf::from(out_dir);
    fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;

    let params = EncoderParams::new(original_count, recovery_count, block_size)
        .context("invalid encoder parameters")?;
    let ctx = GfContext::global();

    let refs: Vec<&[u8]> = originals.iter().map(Vec::as_slice).collect();
    let mut recovery_region = vec![0u8; recovery_count * block_size];
    encode(ctx, params, &refs, &mut recovery_region).context("encode failed")?;

    for (index, block) in originals.iter().enumerate() {
        write_block(&out_dir, index, block)?;
    }
    for (r, block) in recovery_region.chunks(block_size).enumerate() {
        write_block(&out_dir, original_count + r, block)?;
    }

    fs::write(
        out_dir.join(META_FILE),
        format!("{original_count} {recovery_count} {block_size} {}\n", data.len()),
    )
    .with_context(|| format!("failed to write {}", out_dir.join(META_FILE).display()))?;

    log::info!(
        "encoded {} into {} original and {} recovery blocks of {} bytes each",
        input,
        original_count,
        recovery_count,
        block_size
    );
    Ok(())
}

fn handle_decode(matches: &clap::ArgMatches) -> Result<()> {
    let block_dir = PathBuf::from(matches.get_one::<String>("block_dir").expect("block_dir is required"));
    let output = matches.get_one::<String>("output").expect("output is required");

    let meta = fs::read_to_string(block_dir.join(META_FILE))
        .with_context(|| format!("failed to read {}", block_dir.join(META_FILE).display()))?;
    let mut fields = meta.split_whitespace();
    let original_count: usize = fields.next().context("missing original_count in metadata")?.parse()?;
    let recovery_count: usize = fields.next().context("missing recovery_count in metadata")?.parse()?;
    let block_size: usize = fields.next().context("missing block_size in metadata")?.parse()?;
    let file_len: usize = fields.next().context("missing file_len in metadata")?.parse()?;

    let params = EncoderParams::new(original_count, recovery_count, block_size)
        .context("invalid encoder parameters recorded in metadata")?;

    let mut present: Vec<(u8, Vec<u8>)> = Vec::new();
    for index in 0..params.total_count() {
        if let Some(data) = read_block(&block_dir, index, block_size)? {
            present.push((index as u8, data));
        }
    }
    present.sort_by_key(|(index, _)| *index);
    ensure!(
        present.len() >= original_count,
        "found {} blocks, need at least {original_count}",
        present.len()
    );
    present.truncate(original_count);

    let mut blocks: Vec<DecodeBlock> = present
        .iter_mut()
        .map(|(index, data)| DecodeBlock { index: *index, data: data.as_mut_slice() })
        .collect();

    let ctx = GfContext::global();
    decode(ctx, params, &mut blocks).context("decode failed")?;

    let mut reconstructed = Vec::with_capacity(original_count * block_size);
    for block in &blocks {
        reconstructed.extend_from_slice(block.data);
    }
    ensure!(
        reconstructed.len() >= file_len,
        "reconstructed data ({} bytes) is shorter than recorded file length ({file_len})",
        reconstructed.len()
    );
    reconstructed.truncate(file_len);

    fs::write(output, &reconstructed).with_context(|| format!("failed to write {output}"))?;
    log::info!("reconstructed {} bytes to {}", reconstructed.len(), output);
    Ok(())
}

fn write_block(dir: &Path, index: usize, data: &[u8]) -> Result<()> {
    let path = dir.join(format!("block.{index}"));
    fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))
}

fn read_block(dir: &Path, index: usize, block_size: usize) -> Result<Option<Vec<u8>>> {
    let path = dir.join(format!("block.{index}"));
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    if data.len() != block_size {
        bail!("{} has length {} but block_size is {block_size}", path.display(), data.len());
    }
    Ok(Some(data))
}

// (c) 2022 Dimitar Rusev <mitikodev@gmail.com> licensed under GPL-3.0

use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use tracing::{error, info};

use ctxmix::{report, search, Error, ModelConfig, Result};

#[derive(Clone, Copy)]
enum Action {
    Compress,
    Decompress,
    Test,
    Search,
    Report,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if !(3..=4).contains(&args.len()) {
        print_usage_and_exit("Invocation doesn't match usage! Provide 2 or 3 arguments.");
    }
    let action = match args[1].as_str() {
        "c" => Action::Compress,
        "d" => Action::Decompress,
        "t" => Action::Test,
        "s" => Action::Search,
        "r" => Action::Report,
        _ => print_usage_and_exit("Unrecognized option -> <action>!"),
    };
    let path = PathBuf::from(&args[2]);

    if let Err(err) = load_config(args.get(3)).and_then(|config| run_path(&path, action, &config)) {
        error!("{err}");
        process::exit(1);
    }
}

fn load_config(path: Option<&String>) -> Result<ModelConfig> {
    match path {
        Some(path) => ModelConfig::from_json(&fs::read_to_string(path)?),
        None => Ok(ModelConfig::default()),
    }
}

fn run_path(path: &Path, action: Action, config: &ModelConfig) -> Result<()> {
    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() {
                run(&file_path, action, config)?;
            }
        }
        Ok(())
    } else if path.is_file() {
        run(path, action, config)
    } else {
        print_usage_and_exit("Path must be a file or a directory!")
    }
}

fn run(file_path: &Path, action: Action, config: &ModelConfig) -> Result<()> {
    let mut out_path = env::current_dir()?;
    out_path.push(file_path.file_name().ok_or(Error::BadConfig("path has no file name"))?);

    let compress_path = out_path.with_extension("bin");
    let decompress_path = out_path.with_extension("orig");

    let timer = Instant::now();
    match action {
        Action::Compress => {
            compress(file_path, &compress_path, config)?;
            info!("Compression took: {:?}", timer.elapsed());
        }
        Action::Decompress => {
            decompress(file_path, &decompress_path, config)?;
            info!("Decompression took: {:?}", timer.elapsed());
        }
        Action::Test => {
            compress(file_path, &compress_path, config)?;
            info!("Compression took: {:?}", timer.elapsed());
            let timer = Instant::now();
            decompress(&compress_path, &decompress_path, config)?;
            info!("Decompression took: {:?}", timer.elapsed());
            if fs::read(file_path)? == fs::read(&decompress_path)? {
                info!("Compare: OK");
            } else {
                error!("Compare: {} and {} differ", file_path.display(), decompress_path.display());
            }
        }
        Action::Search => {
            let buf = fs::read(file_path)?;
            let (best, size) = search::find_best(&buf, &search::candidates(config))?;
            info!(
                "Best of {}: {} bytes (ratio {:.3}), search took: {:?}",
                file_path.display(),
                size,
                size as f64 / buf.len().max(1) as f64,
                timer.elapsed()
            );
            println!("{}", best.to_json()?);
        }
        Action::Report => {
            let buf = fs::read(file_path)?;
            let report = report::analyze(&buf, config)?;
            let mut writer = BufWriter::new(File::create(out_path.with_extension("html"))?);
            report.write_html(&mut writer)?;
            writer.flush()?;
            info!(
                "Ideal size: {:.0} bytes, report took: {:?}",
                report.total_cost() / 8.0,
                timer.elapsed()
            );
        }
    }

    Ok(())
}

fn compress(input_file: &Path, output_file: &Path, config: &ModelConfig) -> Result<()> {
    let buf = fs::read(input_file)?;
    let compressed = ctxmix::compress(&buf, config)?;
    info!(
        "{}: {} -> {} bytes (ratio {:.3})",
        input_file.display(),
        buf.len(),
        compressed.len(),
        compressed.len() as f64 / buf.len().max(1) as f64
    );
    fs::write(output_file, compressed)?;
    Ok(())
}

fn decompress(input_file: &Path, output_file: &Path, config: &ModelConfig) -> Result<()> {
    let buf = fs::read(input_file)?;
    let decompressed = ctxmix::decompress(&buf, config)?;
    fs::write(output_file, decompressed)?;
    Ok(())
}

fn print_usage_and_exit(msg: &str) -> ! {
    println!("Usage: ctxmix <Action> <Path> [config.json]");
    println!("<Action> [single file]: c (compress), d (decompress), t (test = c + d),");
    println!("                        s (search contexts), r (html prediction report)");
    println!("<Path> can be a single file or a directory");
    println!("Note: Directories are shallow traversed");
    eprintln!("{msg}");
    process::exit(2);
}

//! unitmark - HTML 본문의 측정 단위에 변환값 주석 달기

use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use thiserror::Error;

use unitmark::config::{load_settings, settings_path, EngineConfig};
use unitmark::core::table::{FileSource, InlineSource, TableSource};
use unitmark::dom::html;
use unitmark::page::rewriter::revert_all;
use unitmark::page::walker::collect_text_nodes;
use unitmark::PageConverter;

#[derive(Error, Debug)]
enum CliError {
    #[error("입력 파일 읽기 실패 '{path}': {source}")]
    Input { path: PathBuf, source: io::Error },

    #[error("출력 파일 쓰기 실패 '{path}': {source}")]
    Output { path: PathBuf, source: io::Error },

    #[error("메시지 파일 읽기 실패 '{path}': {source}")]
    Messages { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// HTML input file (default: stdin).
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Annotated HTML output file (default: stdout).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Settings JSON file (default: ~/.config/unitmark/settings.json).
    #[arg(short, long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Conversion table CSV (default: bundled table).
    #[arg(short, long, value_name = "FILE")]
    table: Option<PathBuf>,

    /// Newline-delimited JSON messages delivered after the first pass.
    #[arg(short, long, value_name = "FILE")]
    messages: Option<PathBuf>,

    /// Revert every annotation before writing the output.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    revert: bool,

    /// Print final matches as JSON lines instead of HTML.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    matches: bool,
}

fn main() {
    // 로깅 초기화 (error/warn만 출력)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let input = read_input(cli.input.as_ref())?;
    let mut doc = html::parse(&input);

    let settings = load_settings(&cli.settings.unwrap_or_else(settings_path));
    let source: Box<dyn TableSource> = match cli.table {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(InlineSource::bundled()),
    };

    let mut converter = PageConverter::new(EngineConfig::from(settings));

    if cli.matches {
        // 문서를 바꾸지 않고 매치만 출력
        converter.load_table(source.as_ref());
        let mut lines = String::new();
        for node in collect_text_nodes(&doc, doc.body()) {
            let Some(text) = doc.text(node) else { continue };
            for m in converter.find_matches(text) {
                lines.push_str(&serde_json::to_string(&m)?);
                lines.push('\n');
            }
        }
        return write_output(cli.output.as_ref(), &lines);
    }

    let report = converter.activate(&mut doc, source.as_ref());
    log::info!(
        "첫 스캔: 텍스트 노드 {}개, 주석 {}개",
        report.text_nodes,
        report.annotations
    );

    if let Some(path) = cli.messages {
        let messages = fs::read_to_string(&path).map_err(|source| CliError::Messages {
            path: path.clone(),
            source,
        })?;
        for line in messages.lines().filter(|l| !l.trim().is_empty()) {
            if let Some(report) = converter.handle_message_json(&mut doc, line, source.as_ref()) {
                log::info!("갱신 후 주석 {}개", report.annotations);
            }
        }
    }

    if cli.revert {
        let reverted = revert_all(&mut doc);
        log::info!("주석 {}개 복원", reverted);
    }

    write_output(cli.output.as_ref(), &html::serialize(&doc))
}

fn read_input(path: Option<&PathBuf>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Input {
            path: path.clone(),
            source,
        }),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), CliError> {
    match path {
        Some(path) => fs::write(path, content).map_err(|source| CliError::Output {
            path: path.clone(),
            source,
        }),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

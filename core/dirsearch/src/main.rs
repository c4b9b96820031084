mod adapter;
mod cli;
mod domain;
mod ports;
mod query;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::io::{BufRead, Write};
use std::process;
use std::time::Duration;

use adapter::AppConfig;
use cli::{parse_args, print_completion, Config, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use domain::ReplCommand;
use ports::inbound::RunDirsearchApp;
use query::QueryOptions;
use usecase::SessionOutput;
use wiring::{wire_dirsearch, App};

const REPL_HELP: &str = "\
Type a search term and press Enter to search (an empty line lists everything).
Commands:
  :star <id>     Toggle the star on a record in the current results
  :next, :n      Next page
  :prev, :p      Previous page
  :page <n>      Jump to page n
  :starred, :s   Show or hide the starred items panel
  :refresh, :r   Refetch stale data
  :help, :h, ?   Show this help
  :quit, :q      Exit
Start a search term with '::' to search for a literal ':'.";

/// 入力を読み、セッションに渡し、画面を書き出す Runner
struct Runner<R, W> {
    app: App,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Runner<R, W> {
    fn new(app: App, input: R, output: W) -> Self {
        Self { app, input, output }
    }

    fn log(&self, record: LogRecord) {
        let _ = self.app.logger.log(&record);
    }

    fn write(&mut self, text: &str) -> Result<(), Error> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush())
            .map_err(|e| Error::io_msg(format!("failed to write output: {}", e)))
    }

    /// 走っている取得・書き込みが終わるまで完了通知を適用する
    fn settle(&self) {
        let timeout = settle_timeout(&self.app.config);
        if !self.app.client.wait_idle(timeout) {
            self.log(
                LogRecord::new(
                    LogLevel::Warn,
                    "cli",
                    "lifecycle",
                    "gave up waiting for outstanding requests",
                )
                .field("pending", self.app.client.pending_jobs())
                .field("timeout_ms", timeout.as_millis() as u64),
            );
        }
        self.app.client.gc();
    }

    fn render(&mut self) -> Result<(), Error> {
        self.settle();
        let screen = self.app.session.render()?;
        self.write(&screen)
    }

    /// --query: 1 回検索して最初のページを出して終わる
    fn run_once(&mut self, term: &str) -> Result<i32, Error> {
        self.app.session.mount()?;
        self.app
            .session
            .handle(ReplCommand::Search(term.to_string()))?;
        self.render()?;
        Ok(0)
    }

    fn run_repl(&mut self) -> Result<i32, Error> {
        self.app.session.mount()?;
        self.render()?;
        loop {
            self.write("> ")?;
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| Error::io_msg(format!("failed to read input: {}", e)))?;
            if read == 0 {
                self.write("\n")?;
                return Ok(0);
            }
            let command = match ReplCommand::parse(&line) {
                Ok(c) => c,
                Err(e) => {
                    self.write(&format!("{}\n", e))?;
                    continue;
                }
            };
            match self.app.session.handle(command)? {
                SessionOutput::Render => self.render()?,
                SessionOutput::Message(msg) => self.write(&format!("{}\n", msg))?,
                SessionOutput::Help => self.write(&format!("{}\n", REPL_HELP))?,
                SessionOutput::Quit => return Ok(0),
            }
        }
    }
}

impl<R: BufRead, W: Write> RunDirsearchApp for Runner<R, W> {
    fn run(&mut self, config: Config) -> Result<i32, Error> {
        let mode = if config.query.is_some() { "query" } else { "repl" };
        self.log(
            LogRecord::new(LogLevel::Info, "cli", "lifecycle", "command started")
                .field("mode", mode)
                .field("api_base", self.app.config.api_base_url.as_str()),
        );

        let result = match config.query.as_deref() {
            Some(term) => self.run_once(term),
            None => self.run_repl(),
        };

        let code = result.as_ref().copied().unwrap_or(0);
        self.log(
            LogRecord::new(LogLevel::Info, "cli", "lifecycle", "command finished")
                .field("mode", mode)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            self.log(LogRecord::new(LogLevel::Error, "cli", "error", e.to_string()));
        }
        result
    }
}

/// 最悪ケース（全試行がタイムアウト）でも待ち切れる時間
fn settle_timeout(config: &AppConfig) -> Duration {
    let worst = |options: &QueryOptions| {
        let delays: u64 = (0..options.retry)
            .map(|attempt| options.retry_delay(attempt).as_millis() as u64)
            .sum();
        (u64::from(options.retry) + 1) * config.request_timeout_ms + delays
    };
    let ms = worst(&config.search_options).max(worst(&QueryOptions::default()));
    Duration::from_millis(ms)
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if matches!(e, Error::InvalidArgument(_)) {
                print_usage();
            }
            eprintln!("dirsearch: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

fn print_usage() {
    eprintln!("Usage: dirsearch [-h] [-v] [--api-base url] [--page-size rows] [--log-file path] [-q term]");
}

fn print_help() {
    println!("Usage: dirsearch [-h] [-v] [--api-base url] [--page-size rows] [--log-file path] [-q term]");
    println!("  -h, --help            Display this help message.");
    println!("  -v, --verbose         Echo structured logs to stderr.");
    println!("  --api-base <url>      Base URL of the directory API (default: http://localhost:3001).");
    println!("  --page-size <rows>    Rows per page (default: 10).");
    println!("  --log-file <path>     Write JSONL logs to this file.");
    println!("  -q, --query <term>    Search once, print the first page and exit.");
    println!("  --completion <shell>  Generate shell completion script (bash, zsh, fish).");
    println!("  Without -q, an interactive prompt starts.");
    println!();
    println!("Environment:");
    println!("  DIRSEARCH_HOME      Config directory. Default: $XDG_CONFIG_HOME/dirsearch or ~/.config/dirsearch.");
    println!("  DIRSEARCH_CONFIG    Path of config.json (overrides DIRSEARCH_HOME).");
    println!("  DIRSEARCH_API_BASE  Base URL of the directory API.");
    println!("  DIRSEARCH_LOG_FILE  Path of the JSONL log.");
    println!();
    println!("{}", REPL_HELP);
}

pub fn run() -> Result<i32, Error> {
    let outcome = parse_args()?;
    let config = match outcome {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    // 設定の解決や接続の準備より前に返す（壊れた config.json があってもヘルプは出せる）
    if config.help {
        print_help();
        return Ok(0);
    }
    let app = wire_dirsearch(&config)?;
    let stdin = std::io::stdin();
    let mut runner = Runner::new(app, stdin.lock(), std::io::stdout());
    runner.run(config)
}

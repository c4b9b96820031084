use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::error::Error;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub help: bool,
    /// -v / --verbose: 構造化ログを stderr にも出す
    pub verbose: bool,
    /// --api-base: API のベース URL（環境変数・設定ファイルより優先）
    pub api_base: Option<String>,
    /// --page-size: 1 ページの行数
    pub page_size: Option<usize>,
    /// --log-file: 構造化ログ（JSONL）の出力先
    pub log_file: Option<PathBuf>,
    /// -q / --query: 1 回だけ検索して表示し終了する
    pub query: Option<String>,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

pub(crate) fn build_clap_command() -> clap::Command {
    clap::Command::new("dirsearch")
        .about("Search the company directory and star records")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Echo structured logs to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("api-base")
                .long("api-base")
                .value_name("url")
                .help("Base URL of the directory API (default: http://localhost:3001)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("page-size")
                .long("page-size")
                .value_name("rows")
                .help("Rows per page (default: 10)")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("log-file")
                .long("log-file")
                .value_name("path")
                .help("Write JSONL logs to this file")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("query")
                .short('q')
                .long("query")
                .value_name("term")
                .help("Search once, print the first page and exit")
                .allow_hyphen_values(true)
                .num_args(1),
        )
        .arg(
            clap::Arg::new("completion")
                .long("completion")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    Config {
        help: matches.get_flag("help"),
        verbose: matches.get_flag("verbose"),
        api_base: matches.get_one::<String>("api-base").cloned(),
        page_size: matches.get_one::<usize>("page-size").copied(),
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
        query: matches.get_one::<String>("query").cloned(),
    }
}

fn matches_to_outcome(matches: &clap::ArgMatches) -> ParseOutcome {
    if let Some(&shell) = matches.get_one::<Shell>("completion") {
        return ParseOutcome::GenerateCompletion(shell);
    }
    ParseOutcome::Config(matches_to_config(matches))
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_outcome(&matches))
}

/// テスト用: 引数スライスから解析する
#[allow(dead_code)]
pub fn parse_args_from(args: &[&str]) -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_outcome(&matches))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "dirsearch", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Config {
        match parse_args_from(args).unwrap() {
            ParseOutcome::Config(c) => c,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_config_default() {
        let c = config(&["dirsearch"]);
        assert_eq!(c, Config::default());
    }

    #[test]
    fn test_all_options() {
        let c = config(&[
            "dirsearch",
            "-v",
            "--api-base",
            "http://example.test:8080",
            "--page-size",
            "25",
            "--log-file",
            "/tmp/d.jsonl",
            "-q",
            "ann",
        ]);
        assert!(c.verbose);
        assert_eq!(c.api_base.as_deref(), Some("http://example.test:8080"));
        assert_eq!(c.page_size, Some(25));
        assert_eq!(c.log_file, Some(PathBuf::from("/tmp/d.jsonl")));
        assert_eq!(c.query.as_deref(), Some("ann"));
    }

    #[test]
    fn test_empty_query_is_allowed() {
        let c = config(&["dirsearch", "--query", ""]);
        assert_eq!(c.query.as_deref(), Some(""));
    }

    #[test]
    fn test_completion() {
        let out = parse_args_from(&["dirsearch", "--completion", "bash"]).unwrap();
        assert!(matches!(out, ParseOutcome::GenerateCompletion(Shell::Bash)));
    }

    #[test]
    fn test_invalid_page_size() {
        let err = parse_args_from(&["dirsearch", "--page-size", "many"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}

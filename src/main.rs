use allocsim::knowledge::Knowledge;
use allocsim::logging::{self, LogConfig, LogOutput};
use allocsim::models::{Selection, TableKind};
use allocsim::scenario::ScenarioConfig;
use clap::{Arg, Command};
use tracing::info;

fn main() {
    let matches = Command::new("allocsim")
        .version("0.1.0")
        .about("基地・目標割り当てシナリオ知識 (Allocation Scenario Knowledge)")
        .long_about("割り当てシミュレーション用の静的なシナリオ知識を検証・参照します。\n\
                     シナリオを指定しない場合は組み込みシナリオを使用します。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
                .conflicts_with("query")
        )
        .arg(
            Arg::new("check")
                .short('c')
                .long("check")
                .action(clap::ArgAction::SetTrue)
                .help("テーブル形状の検証のみ実行")
        )
        .arg(
            Arg::new("query")
                .short('q')
                .long("query")
                .value_name("TABLE")
                .value_parser(clap::value_parser!(TableKind))
                .help("テーブルを表示 (plane_capacity, plane_type, target_requirement, agent_plane, agent_thres)")
        )
        .arg(
            Arg::new("index")
                .short('n')
                .long("index")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .requires("query")
                .help("表示する行番号（省略時はテーブル全体）")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("OUTPUT")
                .value_parser(clap::value_parser!(LogOutput))
                .default_value("console")
                .help("ログ出力先 (console, file, both)")
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");
    let level = match matches.get_one::<String>("log-level") {
        Some(s) => match logging::parse_log_level(s) {
            Some(level) => level,
            None => {
                eprintln!("警告: 無効なログレベル '{}'. 詳細出力レベルから決定します", s);
                logging::level_for_verbosity(verbose_level)
            }
        },
        None => logging::level_for_verbosity(verbose_level),
    };
    let log_config = LogConfig {
        level,
        output: matches.get_one::<LogOutput>("log-output").copied().unwrap_or(LogOutput::Console),
        ..LogConfig::default()
    };

    // ガードはプロセス終了まで保持
    let _guard = match logging::init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            None
        }
    };

    let request = Request {
        scenario_path: matches.get_one::<String>("scenario").cloned(),
        info_only: matches.get_flag("info"),
        check_only: matches.get_flag("check"),
        query: matches.get_one::<TableKind>("query").copied(),
        selection: Selection::from(matches.get_one::<usize>("index").copied()),
    };

    if let Err(e) = run(&request) {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

struct Request {
    scenario_path: Option<String>,
    info_only: bool,
    check_only: bool,
    query: Option<TableKind>,
    selection: Selection,
}

fn run(request: &Request) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = match &request.scenario_path {
        Some(path) => {
            let scenario = ScenarioConfig::from_file(path)?;
            info!("シナリオファイル読み込み完了: {}", path);
            scenario
        }
        None => {
            info!("組み込みシナリオを使用します");
            ScenarioConfig::builtin()
        }
    };

    if request.info_only {
        scenario.print_summary();
        return Ok(());
    }

    let knowledge = Knowledge::from_config(&scenario);
    knowledge.check()?;
    info!("テーブル形状の検証に成功しました");

    if request.check_only {
        println!("OK");
        return Ok(());
    }

    match request.query {
        Some(kind) => {
            let result = knowledge.lookup(kind, request.selection)?;
            match request.selection {
                Selection::All => println!("{}:", kind),
                Selection::Row(i) => println!("{}[{}]:", kind, i),
            }
            println!("{}", result);
        }
        None => {
            scenario.print_summary();
            println!();
            println!("検証: OK");
        }
    }

    Ok(())
}

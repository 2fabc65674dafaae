mod cmd;
mod util;

use std::io::Write as _;

use clap::Parser;
use colored::Colorize;
use snipcheck_core::style::ColorTheme;

use crate::cmd::GlobalArgs;

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let level = record.level();
            let tag = format!("[{}]", level).color(level.color()).bold();
            writeln!(buf, "{} {}", tag, record.args())
        })
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();

    let app = GlobalArgs::parse();
    let code = app.exec_subcmd().await.unwrap_or_else(|e| {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    });
    std::process::exit(code);
}

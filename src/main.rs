use kube_cli_installer::install::{self, InstallerError, ui};

fn main() {
    let cli = install::Cli::parse_args();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // The result is fully dropped (sudo ticket included) before exiting.
    let result = rt.block_on(install::run_install(&cli));
    drop(rt);

    if let Err(e) = result {
        match e.downcast_ref::<InstallerError>() {
            Some(err) if err.is_silent() => {}
            Some(err) => ui::error(&err.to_string(), err.fix_suggestion().as_deref()),
            None => {
                log::error!("{e:#}");
                ui::error(&format!("{e:#}"), None);
            }
        }
        std::process::exit(1);
    }
}

use super::super::args::*;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config_path = cli.config.as_deref();
    match cli.cmd {
        Command::Save(args) => super::save::run(args, config_path).await,
        Command::Load(args) => super::load::run(args, config_path).await,
        Command::List(args) => super::review::list(args, config_path).await,
        Command::Summary(args) => super::review::summary(args, config_path).await,
        Command::Show(args) => super::review::show(args, config_path).await,
        Command::Stations => Ok(super::stations::run()),
    }
}

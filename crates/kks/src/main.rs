use clap::Parser;

fn main() -> anyhow::Result<()> {
    kks::init();

    let cli = kks::cli::Cli::parse();
    kks::cli::run(cli)
}

use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = bulk_rename::cli::parse();
    app::run(args)
}

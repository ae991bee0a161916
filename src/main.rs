use clap::Parser;
use miette::IntoDiagnostic;
use search_query::parse;

/// Parse a search query and print its expression tree as JSON.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Query text; multiple arguments are joined with spaces.
    #[clap(required = true)]
    query: Vec<String>,
}

fn main() -> miette::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let input = args.query.join(" ");
    let expr = parse(&input)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&expr).into_diagnostic()?
    );
    Ok(())
}

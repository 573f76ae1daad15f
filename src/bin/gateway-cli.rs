use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Inspect a running blog gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of posts
    Posts {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// List one page of posts carrying a tag
    Tag {
        name: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show a single post
    Post { slug: String },
    /// Print the RSS feed
    Feed,
    /// Check gateway liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Posts { page } => {
            let res = client
                .get(format!("{}/api/getters/posts/{}", base, page))
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Tag { name, page } => {
            let page = page.to_string();
            let mut url = reqwest::Url::parse(base)?;
            url.path_segments_mut()
                .map_err(|_| "gateway URL cannot carry a path")?
                .pop_if_empty()
                .extend(["api", "filter", "tags", name.as_str(), page.as_str()]);
            let res = client.get(url).send().await?;
            print_json(res).await?;
        }
        Commands::Post { slug } => {
            let mut url = reqwest::Url::parse(base)?;
            url.path_segments_mut()
                .map_err(|_| "gateway URL cannot carry a path")?
                .pop_if_empty()
                .extend(["api", "getters", "post", slug.as_str()]);
            let res = client.get(url).send().await?;
            print_json(res).await?;
        }
        Commands::Feed => {
            let res = client.get(format!("{}/feed.rss", base)).send().await?;
            let status = res.status();
            let text = res.text().await?;
            if !status.is_success() {
                eprintln!("Error: gateway returned status {}", status);
                eprintln!("Response: {}", text);
                return Ok(());
            }
            println!("{}", text);
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_json(res).await?;
        }
    }

    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

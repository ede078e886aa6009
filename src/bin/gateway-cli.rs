use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the gateway admin service", long_about = None)]
struct Cli {
    #[arg(short, long, env = "GATEWAY_ADMIN_URL", default_value = "http://localhost:9180")]
    url: String,

    #[arg(short, long, env = "GATEWAY_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check admin service status
    Status,
    /// Show entity counts in the store
    Store,
    /// Export selected routes as an OpenAPI document
    ExportRoutes {
        /// Comma-separated route ids
        ids: String,
    },
    /// Export every route as an OpenAPI document
    ExportAll,
    /// Export the whole configuration as a variablized bundle
    ExportConfig {
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },
    /// Import a bundle file (YAML or JSON, by extension)
    Import { file: PathBuf },
}

/// Thin client for the admin endpoints.
struct AdminClient {
    http: reqwest::Client,
    base: String,
    headers: HeaderMap,
}

impl AdminClient {
    fn new(base: String, key: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut headers = HeaderMap::new();
        if !key.is_empty() {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            headers,
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base, path))
            .headers(self.headers.clone())
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base, path))
            .headers(self.headers.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let admin = AdminClient::new(cli.url, &cli.key)?;

    match cli.command {
        Commands::Status => print_response(admin.get("/admin/status").send().await?).await?,
        Commands::Store => print_response(admin.get("/admin/store").send().await?).await?,
        Commands::ExportRoutes { ids } => {
            let res = admin.get(&format!("/admin/export/routes/{ids}")).send().await?;
            print_response(res).await?;
        }
        Commands::ExportAll => {
            print_response(admin.get("/admin/export/routes").send().await?).await?
        }
        Commands::ExportConfig { format } => {
            let res = admin
                .get("/admin/export/configuration")
                .query(&[("format", format)])
                .send()
                .await?;
            print_text(res).await?;
        }
        Commands::Import { file } => {
            let body = std::fs::read_to_string(&file)?;
            let content_type = match file.extension().and_then(|e| e.to_str()) {
                Some("json") => "application/json",
                _ => "application/yaml",
            };
            let res = admin
                .post("/admin/import/configuration")
                .header(CONTENT_TYPE, content_type)
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Bundles may be YAML, so print them as returned.
async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    println!("{}", text);
    Ok(())
}

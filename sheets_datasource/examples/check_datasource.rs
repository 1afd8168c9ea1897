use clap::Parser;
use sheets_common::{DataSourceInstanceSettings, SheetsSourceOptions, TestStatus};
use sheets_datasource::{DataSource, DataSourceApi, HttpBackendSrv};
use url::Url;

/// Test a configured Google Sheets datasource through a running host and list
/// the spreadsheets it can see.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host base URL
    #[arg(long, default_value = "http://localhost:3000")]
    host_url: Url,

    /// Numeric id the host assigned to the datasource
    #[arg(long)]
    datasource_id: u64,

    /// Host service account token
    #[arg(long)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut backend = HttpBackendSrv::new(args.host_url.clone());
    if let Some(token) = args.token {
        backend = backend.with_token(token);
    }

    let settings = DataSourceInstanceSettings {
        id: args.datasource_id,
        uid: String::new(),
        name: String::new(),
        plugin_type: "google-sheets-datasource".into(),
        json_data: SheetsSourceOptions::default(),
    };
    let ds = DataSource::new(settings, backend);

    println!("Testing datasource {} at {}", args.datasource_id, args.host_url);
    let result = ds.test_datasource().await?;
    match result.status {
        TestStatus::Success => println!("OK: {}", result.message),
        TestStatus::Fail => {
            println!("FAILED: {}", result.message);
            return Ok(());
        }
    }

    let sheets = ds.list_spreadsheets().await?;
    println!("Found {} spreadsheets:", sheets.len());
    for sheet in &sheets {
        println!("- {} ({})", sheet.label, sheet.value);
    }

    Ok(())
}

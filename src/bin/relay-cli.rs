use clap::{Parser, Subcommand};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Command-line client for the student relay", long_about = None)]
struct Cli {
    /// Relay base URL, including any path prefix.
    #[arg(short, long, default_value = "http://localhost:8000/api")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request an access token
    Token {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Fetch student details with an existing token
    Details {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        token: String,
    },
    /// Request a token, then fetch the details of the same student
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Token { email, password } => {
            let json = request_token(&client, base, &email, &password).await?;
            print_json(&json)?;
        }
        Commands::Details { student_id, token } => {
            let json = fetch_details(&client, base, &student_id, &token).await?;
            print_json(&json)?;
        }
        Commands::Login { email, password } => {
            let json = request_token(&client, base, &email, &password).await?;
            let token = json
                .pointer("/data/0/access_token")
                .and_then(Value::as_str)
                .ok_or("token response has no data[0].access_token")?;
            let json = fetch_details(&client, base, &email, token).await?;
            print_json(&json)?;
        }
    }

    Ok(())
}

async fn request_token(
    client: &reqwest::Client,
    base: &str,
    email: &str,
    password: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let res = client
        .post(format!("{}/token/", base))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await?;
    read_json(res).await
}

async fn fetch_details(
    client: &reqwest::Client,
    base: &str,
    student_id: &str,
    token: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    let res = client
        .get(format!("{}/student-details/{}/", base, urlencoding::encode(student_id)))
        .header(AUTHORIZATION, HeaderValue::from_str(&bearer(token))?)
        .send()
        .await?;
    read_json(res).await
}

/// Prefix `Bearer ` unless the token already carries a scheme.
fn bearer(token: &str) -> String {
    if token.contains(' ') {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    }
}

async fn read_json(res: reqwest::Response) -> Result<Value, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        return Err(format!("relay returned status {}: {}", status, text).into());
    }
    Ok(serde_json::from_str(&text)?)
}

fn print_json(json: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(json)?);
    Ok(())
}

//! Greeting client
//!
//! Sends one GET request and prints the response. Values not given as flags
//! are prompted for.

use clap::Parser;
use greet_http::config::ClientConfig;
use greet_http::http::client::{connect_addr, request_for_url};
use greet_http::http::session::FdSessionOps;
use greet_http::http::{GreetResponse, HttpClient, NO_ENCODING};
use greet_http::logging;
use std::io;
use std::net::TcpStream;

#[derive(Parser)]
#[command(name = "greet_client")]
#[command(about = "Send one GET request to a greet server", long_about = None)]
struct Cli {
    /// Target URL, e.g. http://localhost:7481/greet/2306217481?name=Budi
    #[arg(short, long)]
    url: Option<String>,

    /// Accept header value
    #[arg(short, long)]
    accept: Option<String>,

    /// Accept-Encoding value: gzip, deflate or none
    #[arg(short = 'e', long)]
    accept_encoding: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let cli = Cli::parse();

    let config = ClientConfig::complete(
        cli.url,
        cli.accept,
        cli.accept_encoding,
        &mut io::stdin().lock(),
        &mut io::stdout(),
    )?;

    let request = request_for_url(&config.url, &config.accept, &config.accept_encoding)?;
    let addr = connect_addr(&config.url)?;

    let stream = TcpStream::connect(&addr).map_err(|e| {
        tracing::error!(%addr, error = %e, "failed to connect");
        e
    })?;
    let mut client = HttpClient::new(FdSessionOps::new(stream));
    let response = client.fetch(&request)?;
    client.close()?;

    println!("Status Code: {}", response.status());
    if response.content_encoding() != NO_ENCODING {
        println!("Encoded: {}", response.content_encoding());
    }
    println!("Body: {}", String::from_utf8_lossy(response.data()));

    if response.content_type() == "application/json" {
        let parsed: GreetResponse = serde_json::from_slice(response.data())?;
        println!();
        println!("Parsed: {:?}", parsed);
    }

    Ok(())
}

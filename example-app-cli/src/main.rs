//! Command-line interface for the example app gRPC service.
//!
//! This CLI provides commands to create, read, delete and list books.
//! It supports both JSON and text output formats.

use anyhow::Result;
use bomboni_common::date_time::UtcDateTime;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use time::OffsetDateTime;
use tonic::metadata::MetadataMap;

use example_app_api::{
    client::AppClient,
    model::metadata::STATUS_CODE_KEY,
    v1::{
        Book, CreateBookRequest, DeleteBookRequest, FieldMask, ListBookRequest, Pagination,
        ReadBookRequest, Timestamp,
    },
};

/// Command-line interface configuration.
#[derive(Parser)]
#[command(name = "example-app-cli")]
#[command(about = "A CLI tool for interacting with the example app gRPC service")]
#[command(version)]
pub struct Cli {
    /// The gRPC server address
    #[arg(long, short, default_value = "http://127.0.0.1:9000")]
    pub address: String,

    /// Output format (json or text)
    #[arg(long, short = 'J', env = "EXAMPLE_APP_JSON")]
    pub json: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the service version
    Version,
    /// Create a new book
    Create {
        /// Book title
        display_name: String,
        /// Book author
        author: String,
        #[arg(long, default_value = "")]
        isbn: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        price_cents: i64,
        #[arg(long, default_value_t = 0)]
        page_count: i32,
        /// Number of copies in stock
        #[arg(long, default_value_t = 1)]
        amount: i64,
    },
    /// Read a book by ID
    Read {
        id: String,
        /// Fields to return, comma separated
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Delete a book
    Delete { id: String },
    /// List books
    List {
        /// Filter expression, for example `author = "Frank Herbert"`
        #[arg(long, default_value = "")]
        filter: String,
        /// Ordering, for example `price_cents desc, display_name`
        #[arg(long, default_value = "")]
        order_by: String,
        #[arg(long, default_value_t = 0)]
        offset: i32,
        /// Page size, 0 lists everything
        #[arg(long, default_value_t = 0)]
        limit: i32,
        /// Fields to return, comma separated
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = AppClient::connect(&cli.address).await?;

    handle_command(client, cli.command, MetadataMap::new(), cli.json).await
}

/// Handles book CLI commands.
///
/// # Errors
///
/// Returns an error if the gRPC call fails.
async fn handle_command(
    client: AppClient,
    command: Commands,
    metadata: MetadataMap,
    json_output: bool,
) -> Result<()> {
    match command {
        Commands::Version => {
            let version = client.book.get_version(metadata).await?.into_inner().version;
            if json_output {
                println!("{}", json!({ "version": version }));
            } else {
                println!("{version}");
            }
        }

        Commands::Create {
            display_name,
            author,
            isbn,
            description,
            price_cents,
            page_count,
            amount,
        } => {
            let request = CreateBookRequest {
                payload: Some(Book {
                    display_name,
                    author,
                    isbn,
                    description,
                    price_cents,
                    page_count,
                    amount,
                    ..Default::default()
                }),
            };

            let id = client.book.create(request, metadata).await?.into_inner().id;
            if json_output {
                println!("{}", json!({ "id": id }));
            } else {
                println!("Created book {id}");
            }
        }

        Commands::Read { id, fields } => {
            let request = ReadBookRequest {
                id,
                fields: field_mask(fields),
            };

            let response = client.book.read(request, metadata).await?.into_inner();
            if let Some(book) = response.result {
                output_book(&book, json_output);
            }
        }

        Commands::Delete { id } => {
            let response = client
                .book
                .delete(DeleteBookRequest { id: id.clone() }, metadata)
                .await?;
            let status = response
                .metadata()
                .get(STATUS_CODE_KEY)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();

            if json_output {
                println!("{}", json!({ "id": id, "status": status }));
            } else {
                println!("Book {id} deleted ({status})");
            }
        }

        Commands::List {
            filter,
            order_by,
            offset,
            limit,
            fields,
        } => {
            let request = ListBookRequest {
                filter,
                order_by,
                paging: Some(Pagination { offset, limit }),
                fields: field_mask(fields),
            };

            let response = client.book.list(request, metadata).await?.into_inner();
            let next_offset = response.page.map(|page| page.offset);

            if json_output {
                let books: Vec<Value> = response.results.iter().map(book_json).collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "results": books,
                        "next_offset": next_offset,
                    }))?
                );
            } else {
                println!("Books ({} returned):", response.results.len());
                for book in &response.results {
                    println!(
                        "  - {}: {} (Author: {}, Amount: {})",
                        book.id, book.display_name, book.author, book.amount
                    );
                }
                if let Some(next_offset) = next_offset {
                    println!("Next page offset: {next_offset}");
                }
            }
        }
    }

    Ok(())
}

fn field_mask(fields: Vec<String>) -> Option<FieldMask> {
    if fields.is_empty() {
        None
    } else {
        Some(FieldMask { paths: fields })
    }
}

/// Outputs book information in the specified format.
fn output_book(book: &Book, json_output: bool) {
    if json_output {
        match serde_json::to_string_pretty(&book_json(book)) {
            Ok(output) => println!("{output}"),
            Err(err) => eprintln!("{err}"),
        }
    } else {
        println!("Book Details:");
        println!("  ID: {}", book.id);
        println!("  Title: {}", book.display_name);
        println!("  Author: {}", book.author);
        println!("  Description: {}", book.description);
        println!("  ISBN: {}", book.isbn);
        println!("  Price (cents): {}", book.price_cents);
        println!("  Pages: {}", book.page_count);
        println!("  Amount: {}", book.amount);
        println!(
            "  Created: {}",
            book.create_time
                .as_ref()
                .and_then(format_timestamp)
                .unwrap_or_default()
        );
    }
}

fn book_json(book: &Book) -> Value {
    json!({
        "id": book.id,
        "create_time": book.create_time.as_ref().and_then(format_timestamp),
        "display_name": book.display_name,
        "author": book.author,
        "isbn": book.isbn,
        "description": book.description,
        "price_cents": book.price_cents,
        "page_count": book.page_count,
        "amount": book.amount,
    })
}

fn format_timestamp(timestamp: &Timestamp) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(timestamp.seconds)
        .ok()
        .map(|date_time| UtcDateTime::from(date_time).to_string())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::domain::{BookFields, BookId};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/catalog.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    AddBook {
        title: String,
        author: String,
        published_year: i64,
        price: f64,
        #[arg(long)]
        unavailable: bool,
    },
    ListBooks,
    RemoveBook {
        book_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::AddBook {
            title,
            author,
            published_year,
            price,
            unavailable,
        } => {
            let book_id = storage
                .insert_book(&BookFields {
                    title,
                    author,
                    published_year,
                    is_available: !unavailable,
                    price,
                })
                .await?;
            println!("created book_id={}", book_id.0);
        }
        Command::ListBooks => {
            for book in storage.list_books().await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    book.id.0,
                    book.title,
                    book.author,
                    book.published_year,
                    if book.is_available { "available" } else { "unavailable" },
                    book.price
                );
            }
        }
        Command::RemoveBook { book_id } => {
            if storage.delete_book(BookId(book_id)).await? {
                println!("removed book_id={book_id}");
            } else {
                println!("no book with id {book_id}");
            }
        }
    }

    Ok(())
}

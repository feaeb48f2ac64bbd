//! CLI module for embedsync.

pub mod commands;
mod output;

pub use output::Output;

use crate::config::PINECONE_API_KEY_ENV;
use clap::{Parser, Subcommand, ValueEnum};

/// embedsync - embed documents and stream them into a vector database
#[derive(Parser, Debug)]
#[command(name = "embedsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Pinecone API key
    #[arg(long, env = PINECONE_API_KEY_ENV, hide_env_values = true, global = true)]
    pub pinecone_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that build an embedding model.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Embedding provider (openai, trigram)
    #[arg(long)]
    pub provider: Option<String>,

    /// Pretrained model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Embedding dimensions
    #[arg(long)]
    pub dimensions: Option<u32>,

    /// Maximum chunk size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Chunks per embedding call
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Embeddings buffered per upsert
    #[arg(long)]
    pub buffer_size: Option<usize>,

    /// Splitting strategy (sentence, semantic)
    #[arg(long)]
    pub splitting_strategy: Option<String>,
}

/// Vector store backend for the demo.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Hosted Pinecone index
    Pinecone,
    /// In-process store, nothing leaves the machine
    Memory,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Embed a single file and print the first vector
    EmbedFile {
        /// File to embed (pdf, txt, md, ...)
        path: String,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Embed literal queries
    EmbedQuery {
        /// Query texts
        #[arg(required = true)]
        queries: Vec<String>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Embed every supported file in a directory
    EmbedDir {
        /// Directory to walk
        dir: String,

        /// Only include these extensions (repeatable)
        #[arg(short, long = "ext")]
        extensions: Vec<String>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Run the end-to-end demo: embed queries, recreate an index, stream a file into it, list it
    Demo {
        /// File streamed into the index
        #[arg(short, long, default_value = "test_files/test.pdf")]
        file: String,

        /// Index name (defaults to pinecone.index_name)
        #[arg(short, long)]
        index: Option<String>,

        /// Queries to embed (repeatable)
        #[arg(short, long = "query", default_values_t = vec!["Hello world".to_string(), "Hi".to_string()])]
        queries: Vec<String>,

        /// Vector store backend
        #[arg(long, value_enum, default_value_t = Backend::Pinecone)]
        backend: Backend,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// List record ids of a Pinecone index, one page at a time
    List {
        /// Index name (defaults to pinecone.index_name)
        #[arg(short, long)]
        index: Option<String>,

        /// Only ids starting with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Page size
        #[arg(short, long)]
        limit: Option<u32>,

        /// Token from a previous page
        #[arg(long)]
        pagination_token: Option<String>,
    },

    /// Delete a Pinecone index
    DeleteIndex {
        /// Index name
        name: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_demo_defaults() {
        let cli = Cli::try_parse_from(["embedsync", "demo"]).unwrap();
        match cli.command {
            Commands::Demo {
                file,
                index,
                queries,
                backend,
                ..
            } => {
                assert_eq!(file, "test_files/test.pdf");
                assert!(index.is_none());
                assert_eq!(queries, vec!["Hello world", "Hi"]);
                assert_eq!(backend, Backend::Pinecone);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_embed_file_args() {
        let cli = Cli::try_parse_from([
            "embedsync",
            "-vv",
            "embed-file",
            "doc.pdf",
            "--provider",
            "trigram",
            "--chunk-size",
            "200",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::EmbedFile { path, model } => {
                assert_eq!(path, "doc.pdf");
                assert_eq!(model.provider.as_deref(), Some("trigram"));
                assert_eq!(model.chunk_size, Some(200));
                assert_eq!(model.batch_size, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_embed_query_requires_text() {
        assert!(Cli::try_parse_from(["embedsync", "embed-query"]).is_err());
    }

    #[test]
    fn test_api_key_reads_pinecone_env() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let arg = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "pinecone_api_key")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(PINECONE_API_KEY_ENV)));
    }

    #[test]
    fn test_splitting_strategy_flag() {
        let cli = Cli::try_parse_from([
            "embedsync",
            "embed-file",
            "doc.txt",
            "--splitting-strategy",
            "semantic",
        ])
        .unwrap();
        match cli.command {
            Commands::EmbedFile { model, .. } => {
                assert_eq!(model.splitting_strategy.as_deref(), Some("semantic"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

//! Command-line definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use domains::{ItemCategory, ItemType};

#[derive(Parser, Debug)]
#[command(name = "lostit")]
#[command(about = "File triage scanner and lost-and-found catalog client")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Access token printed by `auth callback`; sent as the bearer on catalog calls
    #[arg(long, global = true, env = "LOSTIT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a file as SAFE, SUSPICIOUS or DANGEROUS
    Scan {
        file: PathBuf,

        /// Skip the local engine and go straight to the cloud model
        #[arg(long)]
        no_local: bool,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the local analysis engine
    Engine {
        /// Listen address (defaults to engine.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Browse and manage catalog items
    Items {
        #[command(subcommand)]
        action: ItemsAction,
    },

    /// Sign in through the hosted UI
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Suggest title, category, description and color for an item photo
    Tag { image: PathBuf },

    /// Chat with the help assistant (type /quit to leave)
    Chat,
}

#[derive(Subcommand, Debug)]
pub enum ItemsAction {
    /// List items, optionally filtered
    List(ListArgs),
    /// Report a lost or found item
    Report(ReportArgs),
    /// Claim an OPEN item
    Claim { id: String },
    /// Mark your CLAIMED item as returned
    Resolve { id: String },
    /// Delete an item you reported
    Delete { id: String },
    /// Items you reported and items you claimed
    Mine,
    /// Check that the catalog backend answers
    Health,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long = "type", value_enum)]
    pub kind: Option<KindArg>,
    /// Repeat to allow several categories
    #[arg(long = "category", value_enum)]
    pub categories: Vec<CategoryArg>,
    #[arg(long, default_value = "")]
    pub search: String,
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[arg(long = "type", value_enum)]
    pub kind: KindArg,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, value_enum, default_value = "other")]
    pub category: CategoryArg,
    #[arg(long)]
    pub location: String,
    /// Defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Photo to upload with the report
    #[arg(long)]
    pub image: Option<PathBuf>,
    #[arg(long)]
    pub contact: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Print the hosted login URL
    LoginUrl,
    /// Print the hosted logout URL
    LogoutUrl,
    /// Finish sign-in from the redirect URL the browser landed on
    Callback { redirect: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    Lost,
    Found,
}

impl From<KindArg> for ItemType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Lost => ItemType::Lost,
            KindArg::Found => ItemType::Found,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CategoryArg {
    Electronics,
    Clothing,
    Documents,
    Accessories,
    Keys,
    Other,
}

impl From<CategoryArg> for ItemCategory {
    fn from(category: CategoryArg) -> Self {
        match category {
            CategoryArg::Electronics => ItemCategory::Electronics,
            CategoryArg::Clothing => ItemCategory::Clothing,
            CategoryArg::Documents => ItemCategory::Documents,
            CategoryArg::Accessories => ItemCategory::Accessories,
            CategoryArg::Keys => ItemCategory::Keys,
            CategoryArg::Other => ItemCategory::Other,
        }
    }
}

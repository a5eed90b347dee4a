//! `tp-admin`: command-line admin console.
//!
//! Lists and advances orders and adds product listings against the admin
//! API (or a built-in demo backend with `--demo`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tp_admin_core::environment::SystemClock;
use tp_admin_orders::api::{AdminApi, HttpAdminApi, MockAdminApi};
use tp_admin_orders::config::Config;
use tp_admin_orders::products::{
    ProductFormAction, ProductFormReducer, ProductFormState, ProductsEnvironment,
};
use tp_admin_orders::reducer::{
    LoadState, ManageOrdersAction, ManageOrdersReducer, ManageOrdersState, OrdersEnvironment,
};
use tp_admin_orders::types::{FilterCriteria, OrderId, OrderStatus, ProductImage};
use tp_admin_orders::view;
use tp_admin_runtime::metrics::MetricsServer;
use tp_admin_runtime::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "tp_admin=info,tp_admin_orders=info,tp_admin_runtime=warn";
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

type OrdersStore = Store<ManageOrdersState, ManageOrdersAction, OrdersEnvironment, ManageOrdersReducer>;

/// TP Admin: manage store orders and product listings
#[derive(Parser, Debug)]
#[command(name = "tp-admin", author, version, about, long_about = None)]
struct Cli {
    /// Admin API base URL (overrides `TP_ADMIN_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Use the built-in demo backend instead of the API
    #[arg(long, global = true)]
    demo: bool,

    /// Print Prometheus metrics on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search and list orders
    Orders {
        /// Customer-name substring
        #[arg(long)]
        customer: Option<String>,

        /// Exact order id
        #[arg(long)]
        id: Option<String>,

        /// Pending, Processing or Delivered
        #[arg(long)]
        status: Option<OrderStatus>,

        /// Page to show
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Advance an order to its next status
    Mark {
        /// Order id
        order_id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Add a product listing
    AddProduct {
        /// Product name
        #[arg(long)]
        name: String,

        /// Product description
        #[arg(long)]
        description: String,

        /// Price
        #[arg(long)]
        price: String,

        /// Product image file
        #[arg(long)]
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    let mut metrics = MetricsServer::new();
    if cli.metrics {
        metrics.start()?;
    }

    let api: Arc<dyn AdminApi> = if cli.demo {
        Arc::new(MockAdminApi::seeded())
    } else {
        Arc::new(HttpAdminApi::new(&config.api_url, config.request_timeout)?)
    };

    tracing::info!(
        api_url = %config.api_url,
        demo = cli.demo,
        store = %config.store.code,
        "TP Admin starting"
    );
    println!("TP Admin - {} ({})", config.store.label, config.store.code);

    let outcome = match cli.command {
        Commands::Orders {
            customer,
            id,
            status,
            page,
        } => {
            let criteria = FilterCriteria {
                customer_name: customer.unwrap_or_default(),
                order_id: id.unwrap_or_default(),
                status,
            };
            list_orders(&config, api, criteria, page).await
        },
        Commands::Mark { order_id, yes } => {
            mark_order(&config, api, OrderId::new(order_id), yes).await
        },
        Commands::AddProduct {
            name,
            description,
            price,
            image,
        } => {
            let image = read_image(&image).await?;
            add_product(&config, api, name, description, price, image).await
        },
    };

    if let Some(text) = metrics.render() {
        print!("{text}");
    }
    outcome
}

fn orders_store(config: &Config, api: Arc<dyn AdminApi>, criteria: FilterCriteria) -> OrdersStore {
    let env = OrdersEnvironment::new(api, Arc::new(SystemClock), config.request_timeout);
    Store::new(
        ManageOrdersState::with_criteria(config.page_size, criteria),
        ManageOrdersReducer::new(),
        env,
    )
}

/// Fetch with the store's criteria; `false` if the fetch failed
async fn load(store: &OrdersStore, config: &Config) -> Result<bool> {
    store
        .send_and_wait_for(
            ManageOrdersAction::Load,
            |action| {
                matches!(
                    action,
                    ManageOrdersAction::OrdersLoaded { .. } | ManageOrdersAction::OrdersFailed { .. }
                )
            },
            config.request_timeout + Duration::from_secs(1),
        )
        .await?;

    Ok(!store.state(|s| matches!(s.load, LoadState::Failed(_))).await)
}

async fn list_orders(
    config: &Config,
    api: Arc<dyn AdminApi>,
    criteria: FilterCriteria,
    page: usize,
) -> Result<()> {
    let store = orders_store(config, api, criteria);

    let loaded = load(&store, config).await?;
    if loaded && page != 1 {
        store.send(ManageOrdersAction::GoToPage(page)).await?;
        let (current, pages) = store
            .state(|s| (s.pagination.current_page(), s.page_count()))
            .await;
        if current != page {
            tracing::warn!(page, pages, "Requested page is out of range");
        }
    }

    print!("{}", store.state(view::render).await);
    store.shutdown(SHUTDOWN_TIMEOUT).await?;

    if !loaded {
        bail!("could not load orders");
    }
    Ok(())
}

async fn mark_order(
    config: &Config,
    api: Arc<dyn AdminApi>,
    order_id: OrderId,
    yes: bool,
) -> Result<()> {
    let criteria = FilterCriteria {
        order_id: order_id.to_string(),
        ..FilterCriteria::default()
    };
    let store = orders_store(config, api, criteria);

    if !load(&store, config).await? {
        print!("{}", store.state(view::render).await);
        bail!("could not load order {order_id}");
    }

    store
        .send(ManageOrdersAction::SelectOrder {
            order_id: order_id.clone(),
        })
        .await?;
    let Some(proposed) = store.state(|s| s.status_update.pending().map(|(_, p)| p)).await else {
        bail!("order {order_id} not found");
    };
    print!("{}", store.state(view::render).await);

    if !yes && !confirm(format!("Mark order {order_id} as {proposed}?")).await? {
        store.send(ManageOrdersAction::CancelSelection).await?;
        println!("Cancelled.");
        return Ok(());
    }

    store
        .send_and_wait_for(
            ManageOrdersAction::ConfirmStatusUpdate,
            |action| {
                matches!(
                    action,
                    ManageOrdersAction::StatusUpdated { .. }
                        | ManageOrdersAction::StatusUpdateFailed { .. }
                )
            },
            config.request_timeout + Duration::from_secs(1),
        )
        .await?;

    let notice = store.state(|s| s.notice.clone()).await;
    store.shutdown(SHUTDOWN_TIMEOUT).await?;

    match notice {
        Some(notice) if notice.is_error() => bail!("{notice}"),
        Some(notice) => println!("{notice}"),
        None => {},
    }
    Ok(())
}

async fn add_product(
    config: &Config,
    api: Arc<dyn AdminApi>,
    name: String,
    description: String,
    price: String,
    image: ProductImage,
) -> Result<()> {
    let store = Store::new(
        ProductFormState::default(),
        ProductFormReducer::new(),
        ProductsEnvironment::new(api, config.request_timeout),
    );

    for action in [
        ProductFormAction::SetName(name),
        ProductFormAction::SetDescription(description),
        ProductFormAction::SetPrice(price),
        ProductFormAction::SetImage(image),
    ] {
        store.send(action).await?;
    }

    let mut submission = store.send(ProductFormAction::Submit).await?;
    submission
        .wait_with_timeout(config.request_timeout + Duration::from_secs(1))
        .await?;

    let message = store.state(|s| s.message.clone()).await;
    store.shutdown(SHUTDOWN_TIMEOUT).await?;

    match message {
        Some(message) if message.is_error() => bail!("{message}"),
        Some(message) => println!("{message}"),
        None => bail!("no response to product submission"),
    }
    Ok(())
}

async fn read_image(path: &Path) -> Result<ProductImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading image {}", path.display()))?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let mime = match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };

    Ok(ProductImage {
        file_name,
        mime: mime.to_string(),
        bytes,
    })
}

async fn confirm(prompt: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || -> io::Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{prompt} [y/N] ")?;
        stderr.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    })
    .await?
    .context("reading confirmation")
}

// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use canonical_error::{CanonicalError, CanonicalErrorCode};
use log::{error, info, warn};
use pico_args::Arguments;
use tower_http::{services::ServeDir, cors::CorsLayer, cors::Any};

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry, EnvFilter};
use tracing_appender::{non_blocking::NonBlockingBuilder};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use skysphere_elements::astro_util::WORLD_RADIUS;
use skysphere_elements::scene::SceneModel;
use skysphere_elements::solar_table::SolarTableFormat;
use skysphere_elements::star_catalog::CatalogLayout;

use crate::file_data_source::{FileDataSource, available_solar_tables};
use crate::scene_engine::{SceneEngine, SceneRequest, SceneSettings};

const SOLAR_TABLE_COUNT: usize = 20;

fn http_status(canonical_error: CanonicalError) -> (StatusCode, String) {
    let status = match canonical_error.code {
        CanonicalErrorCode::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        CanonicalErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        CanonicalErrorCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        CanonicalErrorCode::NotFound => StatusCode::NOT_FOUND,
        CanonicalErrorCode::AlreadyExists => StatusCode::CONFLICT,
        CanonicalErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
        CanonicalErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        CanonicalErrorCode::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        CanonicalErrorCode::FailedPrecondition => StatusCode::BAD_REQUEST,
        CanonicalErrorCode::Aborted => StatusCode::CONFLICT,
        CanonicalErrorCode::OutOfRange => StatusCode::BAD_REQUEST,
        CanonicalErrorCode::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        CanonicalErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        CanonicalErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        CanonicalErrorCode::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, canonical_error.message)
}

async fn get_scene(State(engine): State<Arc<SceneEngine>>,
                   Query(request): Query<SceneRequest>)
                   -> Result<Json<SceneModel>, (StatusCode, String)> {
    match engine.build_scene(&request).await {
        Ok(scene) => Ok(Json(scene)),
        Err(e) => {
            warn!("Rejected scene request {:?}: {:?}", request, e);
            Err(http_status(e))
        }
    }
}

/// HTTP surface: the scene endpoint, the raw data files, and optionally a
/// directory holding the renderer.
pub fn router(engine: Arc<SceneEngine>, data_dir: &str, web_dir: Option<&str>) -> Router {
    let mut app: Router<Arc<SceneEngine>> = Router::new()
        .route("/scene", get(get_scene))
        .nest_service("/data", ServeDir::new(data_dir));
    if let Some(web_dir) = web_dir {
        app = app.fallback_service(ServeDir::new(web_dir));
    }
    app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(engine)
}

struct AppArgs {
    data_dir: String,
    catalog_file: String,
    constellation_file: String,
    solar_dir: String,
    catalog_layout: String,
    solar_format: Option<String>,
    radius: f64,
    port: u16,
    web_dir: Option<String>,
    log_dir: String,
    log_file: String,
    once: bool,
    era: Option<String>,
    date: Option<String>,
    mill: Option<String>,
}

impl AppArgs {
    fn scene_settings(&self) -> Result<SceneSettings, CanonicalError> {
        let solar_format = match &self.solar_format {
            Some(label) => Some(SolarTableFormat::from_label(label)?),
            None => None,
        };
        Ok(SceneSettings{
            catalog_path: self.catalog_file.clone(),
            constellation_path: self.constellation_file.clone(),
            solar_dir: self.solar_dir.clone(),
            catalog_layout: CatalogLayout::from_label(&self.catalog_layout)?,
            solar_format,
            radius: self.radius,
        })
    }
}

pub fn server_main(product_name: &str) {
    const HELP: &str = "\
    FLAGS:
      -h, --help                     Prints help information
      --once                         Print one scene as JSON and exit

    OPTIONS:
      --data_dir <path>              ./data
      --catalog_file <path>          bsc5.dat (relative to data_dir)
      --constellation_file <path>    ConstellationLines.dat
      --solar_dir <path>             Solar_data
      --catalog_layout baseline|equatorial|edited
      --solar_format standard|shifted  (default: per table)
      --radius NUMBER                100.0
      --port NUMBER                  8080
      --web_dir <path>               Renderer files to serve at /
      --log_dir <path>               .
      --log_file <file>              skysphere_log.txt
      --era a|b                      With --once; default a
      --date YYYY-Mon-DD             With --once; default today
      --mill DIGIT                   With --once; default from date
    ";

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        println!("{}", HELP);
        std::process::exit(0);
    }
    let args = AppArgs {
        data_dir: pargs.value_from_str("--data_dir").
            unwrap_or("./data".to_string()),
        catalog_file: pargs.value_from_str("--catalog_file").
            unwrap_or("bsc5.dat".to_string()),
        constellation_file: pargs.value_from_str("--constellation_file").
            unwrap_or("ConstellationLines.dat".to_string()),
        solar_dir: pargs.value_from_str("--solar_dir").
            unwrap_or("Solar_data".to_string()),
        catalog_layout: pargs.value_from_str("--catalog_layout").
            unwrap_or("baseline".to_string()),
        solar_format: pargs.opt_value_from_str("--solar_format").unwrap_or(None),
        radius: pargs.value_from_str("--radius").
            unwrap_or(WORLD_RADIUS),
        port: pargs.value_from_str("--port").
            unwrap_or(8080),
        web_dir: pargs.opt_value_from_str("--web_dir").unwrap_or(None),
        log_dir: pargs.value_from_str("--log_dir").
            unwrap_or(".".to_string()),
        log_file: pargs.value_from_str("--log_file").
            unwrap_or("skysphere_log.txt".to_string()),
        once: pargs.contains("--once"),
        era: pargs.opt_value_from_str("--era").unwrap_or(None),
        date: pargs.opt_value_from_str("--date").unwrap_or(None),
        mill: pargs.opt_value_from_str("--mill").unwrap_or(None),
    };
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        eprintln!("Unrecognized arguments {:?}\n{}", remaining, HELP);
        std::process::exit(1);
    }

    // Set up logging. Console output goes to stderr so that --once output on
    // stdout stays clean.
    let file_appender = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&args.log_file)
        .max_log_files(10)
        .build(&args.log_dir) {
            Ok(appender) => appender,
            Err(e) => {
                eprintln!("Could not create log file in {}: {:?}", args.log_dir, e);
                std::process::exit(1);
            }
        };
    let (non_blocking_file, _guard1) = NonBlockingBuilder::default()
        .lossy(false)
        .finish(file_appender);
    let (non_blocking_stderr, _guard2) = NonBlockingBuilder::default()
        .lossy(false)
        .finish(std::io::stderr());
    registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(non_blocking_stderr))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking_file))
        .init();

    if !args.once {
        ctrlc::set_handler(move || {
            info!("Got control-c");
            info!("Exiting");
            std::process::exit(-1);
        }).unwrap_or_else(|e| warn!("Could not install control-c handler: {:?}", e));
    }

    info!("{} starting", product_name);
    let exit_code = async_main(args);
    if exit_code != 0 {
        // Drop the log guards so buffered lines are flushed.
        drop(_guard1);
        drop(_guard2);
        std::process::exit(exit_code);
    }
}

#[tokio::main]
async fn async_main(args: AppArgs) -> i32 {
    let settings = match args.scene_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e.message);
            return 1;
        }
    };
    let data_source = Arc::new(FileDataSource::new(&args.data_dir));

    let solar_dir = data_source.root().join(&settings.solar_dir);
    let tables = available_solar_tables(&solar_dir);
    if tables.len() < SOLAR_TABLE_COUNT {
        warn!("Found {} of {} solar tables in {:?}: {:?}",
              tables.len(), SOLAR_TABLE_COUNT, solar_dir, tables);
    } else {
        info!("Found {} solar tables in {:?}", tables.len(), solar_dir);
    }

    let engine = Arc::new(SceneEngine::new(data_source, settings));

    if args.once {
        let request = SceneRequest{era: args.era.clone(), date_str: args.date.clone(),
                                   mill: args.mill.clone()};
        return match engine.build_scene(&request).await {
            Ok(scene) => match serde_json::to_string_pretty(&scene) {
                Ok(json) => {
                    println!("{}", json);
                    0
                },
                Err(e) => {
                    error!("Could not encode scene: {:?}", e);
                    1
                }
            },
            Err(e) => {
                error!("Could not build scene: {}", e.message);
                2
            }
        };
    }

    if let Some(web_dir) = &args.web_dir {
        if !Path::new(web_dir).is_dir() {
            warn!("Renderer directory {} does not exist", web_dir);
        }
    }
    let app = router(engine, &args.data_dir, args.web_dir.as_deref());

    // Listen on any address for the given port.
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Listening at {:?}", addr);
    if let Err(e) = hyper::Server::bind(&addr)
        .serve(app.into_make_service())
        .await {
            error!("Server error: {:?}", e);
            return 1;
        }
    0
}

// mod tests.

use super::*;
use crate::capture::RasterPause;
use crate::error::{Error, PersistenceError, RenderError, ValidationError};
use crate::exporter::test_helpers::*;
use crate::types::{CO2_EMISSIONS, ReportKind};
use tokio::sync::Notify;

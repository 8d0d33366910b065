//! Page templates and the materialized render surface.
//!
//! A report is laid out as an A4 SVG page and parsed into a `usvg` tree. The
//! parsed tree is the materialized surface: fully laid out (text shaped into
//! paths) and ready for synchronous rasterization by the capture encoder.
//!
//! The renderer owns at most one active surface. Callers receive a
//! [`SurfaceHandle`], a weak reference that stops resolving once the surface is
//! replaced or torn down.

mod analytics;
pub mod svg;
mod sustainability;

use chrono::{DateTime, Utc};
use resvg::usvg;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::error::{RenderError, Result};
use crate::types::{ReportKind, ReportPayload};

/// A laid-out page ready for capture
pub struct MaterializedSurface {
    tree: usvg::Tree,
    kind: ReportKind,
    title: String,
    generated_at: DateTime<Utc>,
    detached: AtomicBool,
}

impl MaterializedSurface {
    /// Laid-out page tree
    pub fn tree(&self) -> &usvg::Tree {
        &self.tree
    }

    /// Page size in CSS pixels
    pub fn size(&self) -> (f32, f32) {
        let size = self.tree.size();
        (size.width(), size.height())
    }

    /// Report kind this surface shows
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Report title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Model-construction timestamp of the report
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Whether the renderer has let go of this surface
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for MaterializedSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializedSurface")
            .field("kind", &self.kind)
            .field("size", &self.size())
            .field("detached", &self.is_detached())
            .finish()
    }
}

/// Stable reference to a materialized surface
#[derive(Clone, Debug)]
pub struct SurfaceHandle {
    surface: Weak<MaterializedSurface>,
}

impl SurfaceHandle {
    /// A handle that never resolves
    pub fn detached() -> Self {
        Self {
            surface: Weak::new(),
        }
    }

    /// Whether the surface is still materialized
    pub fn is_live(&self) -> bool {
        self.surface
            .upgrade()
            .is_some_and(|surface| !surface.is_detached())
    }

    /// Resolve the surface for capture
    pub fn acquire(&self) -> std::result::Result<Arc<MaterializedSurface>, RenderError> {
        match self.surface.upgrade() {
            Some(surface) if !surface.is_detached() => Ok(surface),
            _ => Err(RenderError::SurfaceDetached),
        }
    }
}

/// Lays out reports and keeps the active surface materialized
pub struct TemplateRenderer {
    product_name: String,
    fontdb: Arc<usvg::fontdb::Database>,
    active: Mutex<Option<Arc<MaterializedSurface>>>,
}

impl TemplateRenderer {
    /// Create a renderer; system fonts are loaded once, up front
    pub fn new(product_name: impl Into<String>, load_system_fonts: bool) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        if load_system_fonts {
            fontdb.load_system_fonts();
        }
        tracing::debug!(faces = fontdb.len(), "Loaded font faces for report layout");

        Self {
            product_name: product_name.into(),
            fontdb: Arc::new(fontdb),
            active: Mutex::new(None),
        }
    }

    /// Lay out `report` and make it the active surface
    ///
    /// Any previously active surface is detached; handles to it stop resolving.
    pub fn materialize(&self, report: &ReportPayload) -> Result<SurfaceHandle> {
        let svg = match report {
            ReportPayload::Analytics(data) => analytics::layout(&self.product_name, data)?,
            ReportPayload::Esg(data) => sustainability::layout(&self.product_name, data),
        };

        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_str(&svg, &options).map_err(|e| RenderError::Layout {
            reason: e.to_string(),
        })?;

        let surface = Arc::new(MaterializedSurface {
            tree,
            kind: report.kind(),
            title: report.title(),
            generated_at: report.generated_at(),
            detached: AtomicBool::new(false),
        });
        let handle = SurfaceHandle {
            surface: Arc::downgrade(&surface),
        };

        let previous = self.lock_active().replace(surface);
        if let Some(previous) = previous {
            previous.detach();
        }

        tracing::debug!(kind = ?report.kind(), "Materialized report surface");
        Ok(handle)
    }

    /// Handle to the active surface, if any
    pub fn active(&self) -> Option<SurfaceHandle> {
        self.lock_active().as_ref().map(|surface| SurfaceHandle {
            surface: Arc::downgrade(surface),
        })
    }

    /// Tear down the active surface (e.g. the user navigated away)
    pub fn teardown(&self) {
        if let Some(surface) = self.lock_active().take() {
            surface.detach();
            tracing::debug!(kind = ?surface.kind(), "Tore down report surface");
        }
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<Arc<MaterializedSurface>>> {
        // The slot holds no invariants a panicking holder could break
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

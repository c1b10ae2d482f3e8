//! Operation results, the transaction boundary and the injected clock.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use mesh_types::{EdgeId, EditLog, FaceId, MeshTopology, PolyMesh, VertexId};
use tracing::{debug, warn};

use crate::error::{EditError, EditResult};

/// What a successful operation created and removed.
///
/// Ids are in ascending order. Entities that an operation created and then
/// discarded itself are not listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOutcome {
    /// New vertices.
    pub created_vertices: Vec<VertexId>,
    /// New edges.
    pub created_edges: Vec<EdgeId>,
    /// New faces.
    pub created_faces: Vec<FaceId>,
    /// Vertices the operation removed.
    pub removed_vertices: Vec<VertexId>,
    /// Edges the operation removed.
    pub removed_edges: Vec<EdgeId>,
    /// Faces the operation removed.
    pub removed_faces: Vec<FaceId>,
    /// Wall time, set only by [`timed`].
    pub elapsed: Option<Duration>,
}

impl EditOutcome {
    /// Whether nothing was created or removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created_vertices.is_empty()
            && self.created_edges.is_empty()
            && self.created_faces.is_empty()
            && self.removed_vertices.is_empty()
            && self.removed_edges.is_empty()
            && self.removed_faces.is_empty()
    }
}

impl From<EditLog> for EditOutcome {
    fn from(log: EditLog) -> Self {
        Self {
            created_vertices: log.created_vertices,
            created_edges: log.created_edges,
            created_faces: log.created_faces,
            removed_vertices: log.removed_vertices,
            removed_edges: log.removed_edges,
            removed_faces: log.removed_faces,
            elapsed: None,
        }
    }
}

/// Run `op` as one all-or-nothing edit.
///
/// Opens the mesh journal, runs `op`, and commits if it returns `Ok`. On
/// `Err`, or if `op` panics, every change is rolled back; a panic is
/// reported as [`EditErrorKind::Internal`](crate::EditErrorKind::Internal).
///
/// When called while an edit is already open the outer edit owns the
/// journal: `op` runs directly, its error propagates for the outer edit to
/// roll back, and the returned outcome is empty.
///
/// # Errors
///
/// Returns whatever `op` returns, or an internal error if it panicked.
pub fn transact<F>(mesh: &mut PolyMesh, op: F) -> EditResult
where
    F: FnOnce(&mut PolyMesh) -> EditResult<()>,
{
    if !mesh.begin_edit() {
        op(mesh)?;
        return Ok(EditOutcome::default());
    }

    let result = catch_unwind(AssertUnwindSafe(|| op(&mut *mesh)));
    match result {
        Ok(Ok(())) => Ok(mesh.commit_edit().map(EditOutcome::from).unwrap_or_default()),
        Ok(Err(err)) => {
            mesh.rollback_edit();
            debug!(kind = %err.kind, message = %err.message, "Edit rejected");
            Err(err)
        }
        Err(panic) => {
            mesh.rollback_edit();
            let detail = panic
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "operation panicked".to_string());
            warn!(detail = %detail, "Edit panicked; mesh restored");
            Err(EditError::internal(detail))
        }
    }
}

/// Reject a mesh with no live vertices.
pub(crate) fn ensure_not_empty(mesh: &PolyMesh) -> EditResult<()> {
    if mesh.vertex_count() == 0 {
        Err(EditError::empty_mesh())
    } else {
        Ok(())
    }
}

/// Source of monotonic time for [`timed`].
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic clock for tests.
///
/// Time only moves when [`ManualClock::advance`] is called, or by `step`
/// on every read.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
    step: u64,
}

impl ManualClock {
    /// A clock frozen at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that advances by `step` every time it is read.
    #[must_use]
    pub fn with_step(step: Duration) -> Self {
        Self {
            nanos: AtomicU64::new(0),
            step: u64::try_from(step.as_nanos()).unwrap_or(u64::MAX),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(by, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.fetch_add(self.step, Ordering::Relaxed))
    }
}

/// Run an operation and record its duration on the outcome.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use mesh_edit::{extrude_face, timed, ExtrudeFaceParams, ManualClock};
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// let top = cube.face_ids()[1];
/// let clock = ManualClock::with_step(Duration::from_millis(3));
/// let outcome = timed(&clock, || extrude_face(&mut cube, top, &ExtrudeFaceParams::new(1.0)))
///     .unwrap();
/// assert_eq!(outcome.elapsed, Some(Duration::from_millis(3)));
/// ```
///
/// # Errors
///
/// Returns the operation's error unchanged.
pub fn timed<C, F>(clock: &C, op: F) -> EditResult
where
    C: Clock + ?Sized,
    F: FnOnce() -> EditResult,
{
    let start = clock.now();
    let mut outcome = op()?;
    outcome.elapsed = Some(clock.now().saturating_sub(start));
    Ok(outcome)
}

//! Format dispatch with configurable parameters.

use std::path::Path;

use mesh_model::{MeshModel, Point3, accept_all};
use tracing::debug;

use crate::dmt::read_dmt_limited;
use crate::error::IoResult;
use crate::params::ReadParams;
use crate::partition::Partition;
use crate::stl::read_stl_detected;
use crate::MeshFormat;

/// Reads mesh files of any supported format with a fixed set of parameters.
///
/// The format is chosen from the file extension (see
/// [`MeshFormat::from_path`]). Files with any other extension are skipped:
/// nothing is read, no error is raised and empty models come back.
///
/// # Example
///
/// ```no_run
/// use mesh_ingest::{MeshReader, ReadParams, StlDetection};
/// use mesh_model::{MeshModel, MeshTopology};
///
/// let reader = MeshReader::with_params(
///     ReadParams::default().with_stl_detection(StlDetection::Heuristic),
/// );
///
/// let mut model = MeshModel::new();
/// reader.append(&mut model, "base.dmt").unwrap();
/// let below = reader
///     .append_filtered(&mut model, "lid.stl", |a, b, c| a.z >= 0.0 && b.z >= 0.0 && c.z >= 0.0)
///     .unwrap();
/// println!("{} kept, {} below the XY plane", model.triangle_count(), below.triangle_count());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeshReader {
    params: ReadParams,
}

impl MeshReader {
    /// Create a reader with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with the given parameters.
    #[must_use]
    pub const fn with_params(params: ReadParams) -> Self {
        Self { params }
    }

    /// The parameters in use.
    #[must_use]
    pub const fn params(&self) -> &ReadParams {
        &self.params
    }

    /// Decode a file into kept and excluded models.
    ///
    /// # Errors
    ///
    /// Returns whatever error the selected decoder reports.
    pub fn read_partitioned<P, F>(&self, path: P, filter: F) -> IoResult<Partition>
    where
        P: AsRef<Path>,
        F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
    {
        let path = path.as_ref();
        match MeshFormat::from_path(path) {
            Some(MeshFormat::Dmt) => read_dmt_limited(path, filter, self.params.dmt_header_limit),
            Some(MeshFormat::Stl) => read_stl_detected(path, filter, self.params.stl_detection),
            None => {
                debug!(path = %path.display(), "Unrecognized mesh extension, nothing read");
                Ok(Partition::default())
            }
        }
    }

    /// Decode a file and return only the triangles the filter keeps.
    ///
    /// # Errors
    ///
    /// Returns whatever error the selected decoder reports.
    pub fn read_filtered<P, F>(&self, path: P, filter: F) -> IoResult<MeshModel>
    where
        P: AsRef<Path>,
        F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
    {
        self.read_partitioned(path, filter).map(|parts| parts.kept)
    }

    /// Decode every triangle of a file into a new model.
    ///
    /// # Errors
    ///
    /// Returns whatever error the selected decoder reports.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<MeshModel> {
        self.read_filtered(path, accept_all)
    }

    /// Decode a file and append the kept blocks to `model`.
    ///
    /// Returns the excluded model. `model` is left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns whatever error the selected decoder reports.
    pub fn append_filtered<P, F>(
        &self,
        model: &mut MeshModel,
        path: P,
        filter: F,
    ) -> IoResult<MeshModel>
    where
        P: AsRef<Path>,
        F: Fn(Point3<f64>, Point3<f64>, Point3<f64>) -> bool,
    {
        let Partition { kept, excluded } = self.read_partitioned(path, filter)?;
        model.append(kept);
        Ok(excluded)
    }

    /// Decode every triangle of a file and append the blocks to `model`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the selected decoder reports.
    pub fn append<P: AsRef<Path>>(&self, model: &mut MeshModel, path: P) -> IoResult<()> {
        self.append_filtered(model, path, accept_all).map(|_| ())
    }
}

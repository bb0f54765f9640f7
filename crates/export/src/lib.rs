//! CSV export of trajectory samples.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};

use nbody_geometry::Barycentric;
use nbody_quantities::{Instant, Quantity};
use nbody_trajectory::{DiscreteTrajectory, ForkId};

const HEADER: &str = "t_j2000_s,utc,x_m,y_m,z_m,vx_m_s,vy_m_s,vz_m_s";

/// Create a writer for the target path, handling stdout (`-`) by
/// convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Render an instant as a UTC calendar timestamp. Leap seconds are
/// ignored; the column is for human orientation, not time-keeping.
pub fn format_instant_utc(t: Instant) -> String {
    let j2000: DateTime<Utc> = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
    let microseconds = (t.since_j2000().si() * 1.0e6).round() as i64;
    (j2000 + Duration::microseconds(microseconds)).format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Write the standard trajectory CSV header.
pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
    writeln!(writer, "{}", HEADER)
}

/// Write the logical view of a trajectory node, one row per sample.
pub fn write_trajectory(
    writer: &mut dyn Write,
    trajectory: &DiscreteTrajectory<Barycentric>,
    node: ForkId,
) -> io::Result<()> {
    for (t, dof) in trajectory.iter(node) {
        let p = dof.position.displacement_from_origin();
        let v = dof.velocity;
        writeln!(
            writer,
            "{},{},{:.3},{:.3},{:.3},{:.6},{:.6},{:.6}",
            t.since_j2000().si(),
            format_instant_utc(*t),
            p.x().si(),
            p.y().si(),
            p.z().si(),
            v.x().si(),
            v.y().si(),
            v.z().si(),
        )?;
    }
    Ok(())
}

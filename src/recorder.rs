use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// CSV logger for raw per-sample rows: `sample_index,wall_clock,ch0..chN`.
/// Persistence of the stream is a collaborator concern; the core only hands
/// over plain rows.
pub struct SampleRecorder {
    writer: BufWriter<File>,
    n_channels: usize,
    next_index: u64,
}

impl SampleRecorder {
    pub fn create(path: &Path, n_channels: usize) -> io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        write!(writer, "sample_index,wall_clock")?;
        for channel in 0..n_channels {
            write!(writer, ",ch{channel}")?;
        }
        writeln!(writer)?;
        Ok(Self {
            writer,
            n_channels,
            next_index: 0,
        })
    }

    /// Append one row; values past the configured channel count are dropped,
    /// missing ones are left empty.
    pub fn write_row(&mut self, wall_clock: f64, channels: &[f32]) -> io::Result<()> {
        write!(self.writer, "{},{wall_clock:.4}", self.next_index)?;
        for slot in 0..self.n_channels {
            match channels.get(slot) {
                Some(value) => write!(self.writer, ",{value:.3}")?,
                None => write!(self.writer, ",")?,
            }
        }
        writeln!(self.writer)?;
        self.next_index += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.next_index
    }

    pub fn finish(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let path = std::env::temp_dir().join("alphaband_recorder_test.csv");
        let mut recorder = SampleRecorder::create(&path, 2).unwrap();
        recorder.write_row(0.004, &[1.25, -3.5]).unwrap();
        recorder.write_row(0.008, &[2.0, 4.0]).unwrap();
        assert_eq!(recorder.rows_written(), 2);
        recorder.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("sample_index,wall_clock,ch0,ch1"));
        assert_eq!(lines.next(), Some("0,0.0040,1.250,-3.500"));
        assert_eq!(lines.next(), Some("1,0.0080,2.000,4.000"));
        std::fs::remove_file(&path).ok();
    }
}

//! Dataset utilities.
//!
//! # Rows and Datasets
//!
//! A dataset is an ordered collection of [`XyRow`]s. Every row holds the *features* of a data
//! point, `x`, and its *targets*, `y`. Datasets are built either from in memory tables with
//! [`XyData::convert`], or from *comma-separated values* with [`XyData::from_csv_reader`]; in
//! both cases the columns before `y_start` become the features and the remaining ones the
//! targets.
//!
//! ```
//! use myras_data::XyData;
//!
//! let csv_content = "\
//!     x,y\n\
//!     0.0,0.0\n\
//!     0.5,0.47\n\
//!     1.0,0.84";
//!
//! let data = XyData::from_csv_reader(csv_content.as_bytes(), 1, true).unwrap();
//! assert_eq!(data.len(), 3);
//! assert_eq!(data.rows()[2].y, vec![0.84]);
//! ```
//!
//! # Batching
//!
//! Models are fed with *batches*: pairs of tensors of shape `(batch_size, features)` and
//! `(batch_size, targets)`. [`XyData::batches`] yields only full batches, the trailing rows that
//! do not fill a batch are skipped.
//!
//! # Scaling
//!
//! [`Scaler`] maps values linearly from one range to another and back.
use std::{fs::File, io::Read, path::Path};

use csv::ReaderBuilder;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use myras_core::{ConfigError, DataError, Result, Shape};
use myras_variable::Tensor;

mod scaler;

pub use scaler::Scaler;

/// A single data point: its features and its targets.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct XyRow {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
}

impl XyRow {
    pub fn new(x: Vec<f32>, y: Vec<f32>) -> Self {
        Self { x, y }
    }
}

/// An ordered collection of uniquely owned [`XyRow`]s.
///
/// See also the [*module level documentation*](index.html).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct XyData {
    rows: Vec<XyRow>,
}

impl XyData {
    pub fn new(rows: Vec<XyRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[XyRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [XyRow] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<XyRow> {
        self.rows
    }

    /// Returns the number of rows stored in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Checks whether the dataset is empty or not.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Builds a dataset from a table, splitting every row at column `y_start`.
    ///
    /// # Arguments
    ///
    /// * `table` - rows of values, all of the same width.
    ///
    /// * `y_start` - index of the first target column. All the columns before it are features.
    ///
    /// # Errors
    ///
    /// If the rows have different widths or if `y_start` is past the width of a row.
    pub fn convert<T>(table: &[T], y_start: usize) -> Result<Self>
    where
        T: AsRef<[f32]>,
    {
        let width = match table.first() {
            Some(row) => row.as_ref().len(),
            None => return Ok(Self::default()),
        };

        if y_start > width {
            return Err(DataError::TargetColumn {
                start: y_start,
                width,
            }
            .into());
        }

        let rows = table
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let row = row.as_ref();
                if row.len() != width {
                    return Err(DataError::RowWidth {
                        row: index,
                        expected: width,
                        got: row.len(),
                    }
                    .into());
                }

                let (x, y) = row.split_at(y_start);
                Ok(XyRow::new(x.to_vec(), y.to_vec()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows })
    }

    /// Loads a dataset from a reader of *comma-separated values*.
    ///
    /// # Arguments
    ///
    /// * `src` - reader from which to load the data.
    ///
    /// * `y_start` - index of the first target column.
    ///
    /// * `has_headers` - whether the first line holds the column names and must be skipped.
    pub fn from_csv_reader<R: Read>(src: R, y_start: usize, has_headers: bool) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .trim(csv::Trim::All)
            .from_reader(src);

        let table = reader
            .deserialize::<Vec<f32>>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|error| DataError::Csv(error.to_string()))?;

        debug!(rows = table.len(), "loaded csv records");
        Self::convert(&table, y_start)
    }

    /// Loads a dataset from the *.csv* file at `path`.
    ///
    /// The first line of the file is treated as an header.
    pub fn from_csv<P: AsRef<Path>>(path: P, y_start: usize) -> Result<Self> {
        let file = File::open(path).map_err(|error| DataError::Csv(error.to_string()))?;

        Self::from_csv_reader(file, y_start, true)
    }

    /// Splits the dataset into a training and a test set.
    ///
    /// The test rows are picked at evenly spaced positions over the whole dataset, so that
    /// both sets cover the same range of an ordered dataset. The relative order of the rows is
    /// preserved in both sets.
    ///
    /// # Arguments
    ///
    /// `factor` - fraction of the rows to keep for training, in *[0, 1]*.
    pub fn split(self, factor: f32) -> Result<(XyData, XyData)> {
        if !(0. ..=1.).contains(&factor) {
            return Err(DataError::SplitFactor { factor }.into());
        }

        let len = self.rows.len();
        let test_len = len - (factor * len as f32) as usize;
        if test_len == 0 {
            return Ok((self, XyData::default()));
        }

        let mut train = Vec::with_capacity(len - test_len);
        let mut test = Vec::with_capacity(test_len);

        let step = len as f32 / test_len as f32;
        let mut next_pick = 0.;
        for (index, row) in self.rows.into_iter().enumerate() {
            if index >= next_pick as usize {
                test.push(row);
                next_pick += step;
            } else {
                train.push(row);
            }
        }

        debug!(train = train.len(), test = test.len(), "split dataset");
        Ok((XyData::new(train), XyData::new(test)))
    }

    /// Randomly shuffles the dataset.
    pub fn shuffle(&mut self) -> &mut Self {
        self.shuffle_with_seed(rand::thread_rng().gen())
    }

    /// Randomly shuffles the dataset.
    ///
    /// This version allows for a seed to be specified for results reproducibility.
    pub fn shuffle_with_seed(&mut self, seed: u64) -> &mut Self {
        let mut rng = StdRng::seed_from_u64(seed);
        self.rows.shuffle(&mut rng);

        self
    }

    /// Scales the features with `x_scaler` and the targets with `y_scaler`, in place.
    pub fn scale(&mut self, x_scaler: &Scaler, y_scaler: &Scaler) -> &mut Self {
        for row in self.rows.iter_mut() {
            x_scaler.scale_in_place(&mut row.x);
            y_scaler.scale_in_place(&mut row.y);
        }

        self
    }

    /// Divides the dataset into batches of `batch_size` rows.
    ///
    /// Each item is a pair of tensors of shape `(batch_size, features)` and
    /// `(batch_size, targets)`. The rows left after the last full batch are not yielded.
    ///
    /// # Errors
    ///
    /// If `batch_size` is zero. The iterator yields an error for a batch whose rows disagree on
    /// their widths.
    pub fn batches(&self, batch_size: usize) -> Result<Batches<'_>> {
        if batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize.into());
        }

        Ok(Batches {
            chunks: self.rows.chunks_exact(batch_size),
            batch_size,
            offset: 0,
        })
    }
}

impl From<Vec<XyRow>> for XyData {
    fn from(rows: Vec<XyRow>) -> Self {
        Self::new(rows)
    }
}

/// Iterator over the full batches of an [`XyData`].
///
/// This struct is created by [`XyData::batches`].
pub struct Batches<'a> {
    chunks: std::slice::ChunksExact<'a, XyRow>,
    batch_size: usize,
    offset: usize,
}

impl<'a> Batches<'a> {
    fn stack(&self, rows: &[XyRow], column: impl Fn(&XyRow) -> &[f32]) -> Result<Tensor> {
        let width = rows.first().map_or(0, |row| column(row).len());
        let mut values = Vec::with_capacity(rows.len() * width);

        for (index, row) in rows.iter().enumerate() {
            let row = column(row);
            if row.len() != width {
                return Err(DataError::RowWidth {
                    row: self.offset + index,
                    expected: width,
                    got: row.len(),
                }
                .into());
            }
            values.extend_from_slice(row);
        }

        let shape = Shape::new(vec![self.batch_size, width])?;
        Tensor::from_shape_vec(&shape, values)
    }
}

impl<'a> Iterator for Batches<'a> {
    type Item = Result<(Tensor, Tensor)>;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.chunks.next()?;

        let batch = self
            .stack(rows, |row| &row.x)
            .and_then(|x| Ok((x, self.stack(rows, |row| row.y.as_slice())?)));
        self.offset += self.batch_size;

        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<'a> ExactSizeIterator for Batches<'a> {}

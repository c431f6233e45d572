//! The data handle consumed by training and prediction.
//!
//! A [`DMatrix`] is a dense `num_row x num_col` matrix of `f32` features where
//! NaN marks a missing entry, plus optional per-row label, weight and base
//! margin, plus optional feature names and feature types.

use crate::core::error::{DatasetError, Result, XGBoostError};
use crate::core::types::*;
use crate::dataset::feature::{default_feature_names, validate_feature_names, FeatureTypeSpec};

use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Dimension, Ix2};
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Element types accepted by [`DMatrix::from_array`].
///
/// Numeric primitives convert to `f32`. Text elements are accepted by the type
/// system so the rejection can be reported as a validation error.
pub trait MatrixElement {
    /// Whether values of this type are numeric.
    const IS_NUMERIC: bool;

    /// Convert to a feature value. Only called when `IS_NUMERIC` is true.
    fn to_feature(&self) -> f32;
}

macro_rules! impl_numeric_element {
    ($($t:ty),*) => {
        $(
            impl MatrixElement for $t {
                const IS_NUMERIC: bool = true;

                fn to_feature(&self) -> f32 {
                    AsPrimitive::<f32>::as_(*self)
                }
            }
        )*
    };
}

impl_numeric_element!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl MatrixElement for bool {
    const IS_NUMERIC: bool = true;

    fn to_feature(&self) -> f32 {
        if *self {
            1.0
        } else {
            0.0
        }
    }
}

macro_rules! impl_text_element {
    ($($t:ty),*) => {
        $(
            impl MatrixElement for $t {
                const IS_NUMERIC: bool = false;

                fn to_feature(&self) -> f32 {
                    f32::NAN
                }
            }
        )*
    };
}

impl_text_element!(String, &str, char);

/// Feature matrix with labels and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DMatrix {
    /// Feature matrix (num_row × num_col), NaN marks missing values
    features: Array2<f32>,
    /// Per-row labels, empty when unset
    labels: Array1<Label>,
    /// Per-row weights, empty when unset
    weights: Array1<Label>,
    /// Initial margins (num_row × groups, row-major), empty when unset
    base_margin: Array1<Score>,
    /// Explicit feature names
    feature_names: Option<Vec<String>>,
    /// Explicit feature types
    feature_types: Option<Vec<FeatureType>>,
}

impl DMatrix {
    /// Wrap a dense matrix. NaN entries are treated as missing.
    pub fn from_dense(features: Array2<f32>) -> Self {
        DMatrix {
            features,
            labels: Array1::zeros(0),
            weights: Array1::zeros(0),
            base_margin: Array1::zeros(0),
            feature_names: None,
            feature_types: None,
        }
    }

    /// Build from an array of any rank and element type.
    ///
    /// Only 2-D numeric input is accepted: other ranks fail with
    /// [`DatasetError::InvalidDimensions`], text elements with
    /// [`DatasetError::NonNumericData`].
    ///
    /// ```
    /// use ndarray::{array, Array3};
    /// use xgboost_rust::DMatrix;
    ///
    /// let dm = DMatrix::from_array(&array![[1, 2, 3], [4, 5, 6]]).unwrap();
    /// assert_eq!((dm.num_row(), dm.num_col()), (2, 3));
    /// assert!(DMatrix::from_array(&Array3::<f32>::zeros((2, 2, 2))).is_err());
    /// ```
    pub fn from_array<S, T, D>(data: &ArrayBase<S, D>) -> Result<Self>
    where
        S: Data<Elem = T>,
        T: MatrixElement,
        D: Dimension,
    {
        Self::from_array_with_missing(data, f32::NAN)
    }

    /// Same as [`DMatrix::from_array`], mapping entries equal to `missing` to NaN.
    pub fn from_array_with_missing<S, T, D>(data: &ArrayBase<S, D>, missing: f32) -> Result<Self>
    where
        S: Data<Elem = T>,
        T: MatrixElement,
        D: Dimension,
    {
        if data.ndim() != 2 {
            return Err(DatasetError::InvalidDimensions { ndim: data.ndim() }.into());
        }
        if !T::IS_NUMERIC {
            return Err(DatasetError::NonNumericData {
                dtype: std::any::type_name::<T>().to_string(),
            }
            .into());
        }

        let view = data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|e| XGBoostError::internal(format!("2-D view of 2-D input failed: {}", e)))?;
        let features = view.map(|v| {
            let value = v.to_feature();
            if value == missing {
                f32::NAN
            } else {
                value
            }
        });

        Ok(Self::from_dense(features))
    }

    /// Load from a LibSVM/CSV text file or a binary cache written by [`DMatrix::save_binary`].
    ///
    /// A `?format=csv&label_column=0` suffix selects CSV input explicitly.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::dataset::loader::load_dmatrix(path.as_ref())
    }

    /// Start a builder
    pub fn builder() -> DMatrixBuilder {
        DMatrixBuilder::new()
    }

    /// Number of rows
    pub fn num_row(&self) -> usize {
        self.features.nrows()
    }

    /// Number of columns
    pub fn num_col(&self) -> usize {
        self.features.ncols()
    }

    /// Feature matrix view
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// Labels, empty when unset
    pub fn get_label(&self) -> ArrayView1<'_, Label> {
        self.labels.view()
    }

    /// Whether labels are set
    pub fn has_label(&self) -> bool {
        !self.labels.is_empty()
    }

    /// Set per-row labels
    pub fn set_label(&mut self, labels: &[Label]) -> Result<()> {
        if labels.len() != self.num_row() {
            return Err(DatasetError::LabelLength {
                expected: self.num_row(),
                actual: labels.len(),
            }
            .into());
        }
        self.labels = Array1::from(labels.to_vec());
        Ok(())
    }

    /// Weights, empty when unset
    pub fn get_weight(&self) -> ArrayView1<'_, Label> {
        self.weights.view()
    }

    /// Weights as an option, the form consumed by objectives and metrics
    pub fn weights(&self) -> Option<ArrayView1<'_, Label>> {
        if self.weights.is_empty() {
            None
        } else {
            Some(self.weights.view())
        }
    }

    /// Set per-row weights
    pub fn set_weight(&mut self, weights: &[Label]) -> Result<()> {
        if weights.len() != self.num_row() {
            return Err(DatasetError::WeightLength {
                expected: self.num_row(),
                actual: weights.len(),
            }
            .into());
        }
        self.weights = Array1::from(weights.to_vec());
        Ok(())
    }

    /// Base margin, empty when unset
    pub fn get_base_margin(&self) -> ArrayView1<'_, Score> {
        self.base_margin.view()
    }

    /// Set initial margins; length must be a multiple of the row count.
    pub fn set_base_margin(&mut self, margin: &[Score]) -> Result<()> {
        let rows = self.num_row();
        if rows == 0 || margin.is_empty() || margin.len() % rows != 0 {
            return Err(DatasetError::BaseMarginLength {
                rows,
                actual: margin.len(),
            }
            .into());
        }
        self.base_margin = Array1::from(margin.to_vec());
        Ok(())
    }

    /// Feature names; positional defaults when none were set
    pub fn feature_names(&self) -> Vec<String> {
        match &self.feature_names {
            Some(names) => names.clone(),
            None => default_feature_names(self.num_col()),
        }
    }

    /// Whether feature names were set explicitly
    pub fn has_feature_names(&self) -> bool {
        self.feature_names.is_some()
    }

    /// Assign feature names; `None` restores positional defaults and clears feature types.
    pub fn set_feature_names(&mut self, names: Option<Vec<String>>) -> Result<()> {
        match names {
            Some(names) if !names.is_empty() => {
                validate_feature_names(&names, self.num_col())?;
                self.feature_names = Some(names);
            }
            _ => {
                self.feature_names = None;
                self.feature_types = None;
            }
        }
        Ok(())
    }

    /// Feature types, `None` when unset
    pub fn feature_types(&self) -> Option<&[FeatureType]> {
        self.feature_types.as_deref()
    }

    /// Assign feature types; `None` clears them.
    pub fn set_feature_types(&mut self, types: Option<FeatureTypeSpec>) -> Result<()> {
        self.feature_types = match types {
            Some(spec) => Some(spec.resolve(self.num_col())?),
            None => None,
        };
        Ok(())
    }

    /// Rows selected by index, with labels, weights and metadata carried along.
    pub fn slice(&self, indices: &[usize]) -> Result<Self> {
        let rows = self.num_row();
        if let Some(&index) = indices.iter().find(|&&i| i >= rows) {
            return Err(DatasetError::RowIndex { index, rows }.into());
        }

        let pick = |values: &Array1<f32>, width: usize| -> Array1<f32> {
            if values.is_empty() {
                return Array1::zeros(0);
            }
            indices
                .iter()
                .flat_map(|&i| values.slice(ndarray::s![i * width..(i + 1) * width]).to_vec())
                .collect()
        };

        let margin_width = if rows == 0 { 0 } else { self.base_margin.len() / rows };
        Ok(DMatrix {
            features: self.features.select(Axis(0), indices),
            labels: pick(&self.labels, 1),
            weights: pick(&self.weights, 1),
            base_margin: pick(&self.base_margin, margin_width),
            feature_names: self.feature_names.clone(),
            feature_types: self.feature_types.clone(),
        })
    }

    /// Write the binary cache form, readable by [`DMatrix::from_file`].
    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::dataset::binary::save_binary(self, path.as_ref())
    }

    /// Consistency checks applied to deserialized matrices.
    pub(crate) fn check_consistency(&self) -> Result<()> {
        let rows = self.num_row();
        if !self.labels.is_empty() && self.labels.len() != rows {
            return Err(DatasetError::LabelLength {
                expected: rows,
                actual: self.labels.len(),
            }
            .into());
        }
        if !self.weights.is_empty() && self.weights.len() != rows {
            return Err(DatasetError::WeightLength {
                expected: rows,
                actual: self.weights.len(),
            }
            .into());
        }
        if !self.base_margin.is_empty() && (rows == 0 || self.base_margin.len() % rows != 0) {
            return Err(DatasetError::BaseMarginLength {
                rows,
                actual: self.base_margin.len(),
            }
            .into());
        }
        if let Some(names) = &self.feature_names {
            validate_feature_names(names, self.num_col())?;
        }
        if let Some(types) = &self.feature_types {
            if types.len() != self.num_col() {
                return Err(DatasetError::FeatureTypeCount {
                    expected: self.num_col(),
                    actual: types.len(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Builder for [`DMatrix`]
#[derive(Debug, Default)]
pub struct DMatrixBuilder {
    features: Option<Array2<f32>>,
    labels: Option<Vec<Label>>,
    weights: Option<Vec<Label>>,
    base_margin: Option<Vec<Score>>,
    feature_names: Option<Vec<String>>,
    feature_types: Option<FeatureTypeSpec>,
    missing: Option<f32>,
}

impl DMatrixBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feature matrix
    pub fn data(mut self, features: Array2<f32>) -> Self {
        self.features = Some(features);
        self
    }

    /// Set the labels
    pub fn label<L: Into<Vec<Label>>>(mut self, labels: L) -> Self {
        self.labels = Some(labels.into());
        self
    }

    /// Set the weights
    pub fn weight<W: Into<Vec<Label>>>(mut self, weights: W) -> Self {
        self.weights = Some(weights.into());
        self
    }

    /// Set the base margin
    pub fn base_margin<M: Into<Vec<Score>>>(mut self, margin: M) -> Self {
        self.base_margin = Some(margin.into());
        self
    }

    /// Set the feature names
    pub fn feature_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Set the feature types
    pub fn feature_types<T: Into<FeatureTypeSpec>>(mut self, types: T) -> Self {
        self.feature_types = Some(types.into());
        self
    }

    /// Value treated as missing in addition to NaN
    pub fn missing(mut self, missing: f32) -> Self {
        self.missing = Some(missing);
        self
    }

    /// Validate and build the matrix
    pub fn build(self) -> Result<DMatrix> {
        let mut features = self.features.ok_or(DatasetError::Empty)?;
        if let Some(missing) = self.missing.filter(|m| !m.is_nan()) {
            features.mapv_inplace(|v| if v == missing { f32::NAN } else { v });
        }

        let mut matrix = DMatrix::from_dense(features);
        if let Some(names) = self.feature_names {
            matrix.set_feature_names(Some(names))?;
        }
        if let Some(types) = self.feature_types {
            matrix.set_feature_types(Some(types))?;
        }
        if let Some(labels) = self.labels {
            matrix.set_label(&labels)?;
        }
        if let Some(weights) = self.weights {
            matrix.set_weight(&weights)?;
        }
        if let Some(margin) = self.base_margin {
            matrix.set_base_margin(&margin)?;
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array, Array3, ArrayD, IxDyn};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_array_shapes() {
        let dm = DMatrix::from_array(&array![[1.0f64, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
        assert_eq!(dm.num_row(), 3);
        assert_eq!(dm.num_col(), 2);

        let scalar = ArrayD::<f32>::zeros(IxDyn(&[]));
        let err = DMatrix::from_array(&scalar).unwrap_err();
        assert_eq!(err.dataset_error(), Some(&DatasetError::InvalidDimensions { ndim: 0 }));

        let err = DMatrix::from_array(&Array::from(vec![1.0f32, 2.0, 3.0])).unwrap_err();
        assert_eq!(err.dataset_error(), Some(&DatasetError::InvalidDimensions { ndim: 1 }));

        let err = DMatrix::from_array(&Array3::<f32>::zeros((1, 2, 3))).unwrap_err();
        assert_eq!(err.dataset_error(), Some(&DatasetError::InvalidDimensions { ndim: 3 }));
    }

    #[test]
    fn test_from_array_rejects_text() {
        let data = array![["a", "b"], ["c", "d"]];
        let err = DMatrix::from_array(&data).unwrap_err();
        assert!(matches!(
            err.dataset_error(),
            Some(DatasetError::NonNumericData { .. })
        ));
    }

    #[test]
    fn test_missing_marker() {
        let dm = DMatrix::from_array_with_missing(&array![[1i32, -999], [2, 3]], -999.0).unwrap();
        assert!(dm.features()[[0, 1]].is_nan());
        assert_eq!(dm.features()[[1, 1]], 3.0);

        let dm = DMatrix::builder()
            .data(array![[0.0f32, 1.0]])
            .missing(0.0)
            .build()
            .unwrap();
        assert!(dm.features()[[0, 0]].is_nan());
    }

    #[test]
    fn test_feature_names_lifecycle() {
        let mut dm = DMatrix::from_dense(Array2::zeros((4, 5)));
        assert!(!dm.has_feature_names());
        assert_eq!(dm.feature_names(), names(&["f0", "f1", "f2", "f3", "f4"]));

        dm.set_feature_names(Some(names(&["a", "b", "c", "d", "e"]))).unwrap();
        assert_eq!(dm.feature_names(), names(&["a", "b", "c", "d", "e"]));

        dm.set_feature_types(Some("q".into())).unwrap();
        assert_eq!(dm.feature_types(), Some(&[FeatureType::Quantitative; 5][..]));

        dm.set_feature_names(None).unwrap();
        assert_eq!(dm.feature_names(), names(&["f0", "f1", "f2", "f3", "f4"]));
        assert!(dm.feature_types().is_none());
    }

    #[test]
    fn test_invalid_feature_names_leave_state_unchanged() {
        let mut dm = DMatrix::from_dense(Array2::zeros((2, 3)));
        dm.set_feature_names(Some(names(&["x", "y", "z"]))).unwrap();

        assert!(dm.set_feature_names(Some(names(&["a", "b"]))).is_err());
        assert!(dm.set_feature_names(Some(names(&["a", "a", "b"]))).is_err());
        assert!(dm.set_feature_names(Some(names(&["a<0", "b", "c"]))).is_err());
        assert_eq!(dm.feature_names(), names(&["x", "y", "z"]));
    }

    #[test]
    fn test_builder_validates_lengths() {
        let err = DMatrix::builder()
            .data(Array2::zeros((3, 2)))
            .label(vec![1.0, 0.0])
            .build()
            .unwrap_err();
        assert!(matches!(err.dataset_error(), Some(DatasetError::LabelLength { .. })));

        let err = DMatrix::builder()
            .data(Array2::zeros((3, 2)))
            .feature_names(["a", "b", "c"])
            .build()
            .unwrap_err();
        assert!(matches!(
            err.dataset_error(),
            Some(DatasetError::FeatureNameCount { expected: 2, actual: 3 })
        ));

        assert!(DMatrix::builder().build().is_err());
    }

    #[test]
    fn test_slice_carries_metadata() {
        let dm = DMatrix::builder()
            .data(array![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]])
            .label(vec![0.0, 1.0, 0.0])
            .weight(vec![1.0, 2.0, 3.0])
            .base_margin(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6])
            .feature_names(["a", "b"])
            .build()
            .unwrap();

        let sliced = dm.slice(&[2, 0]).unwrap();
        assert_eq!(sliced.num_row(), 2);
        assert_eq!(sliced.features(), array![[5.0f32, 6.0], [1.0, 2.0]]);
        assert_eq!(sliced.get_label().to_vec(), vec![0.0, 0.0]);
        assert_eq!(sliced.get_weight().to_vec(), vec![3.0, 1.0]);
        assert_eq!(sliced.get_base_margin().to_vec(), vec![0.5, 0.6, 0.1, 0.2]);
        assert_eq!(sliced.feature_names(), names(&["a", "b"]));

        assert!(dm.slice(&[3]).is_err());
    }
}

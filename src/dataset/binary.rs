//! Binary cache form of a [`DMatrix`]: an 8 byte magic followed by a bincode payload.

use crate::core::constants::DMATRIX_MAGIC;
use crate::core::error::{Result, XGBoostError};
use crate::dataset::dmatrix::DMatrix;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Write `matrix` to `path`.
pub fn save_binary(matrix: &DMatrix, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        XGBoostError::engine(format!("failed to create {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    writer.write_all(DMATRIX_MAGIC)?;
    bincode::serialize_into(&mut writer, matrix)?;
    writer.flush()?;

    log::debug!(
        "{}x{} matrix saved to {}",
        matrix.num_row(),
        matrix.num_col(),
        path.display()
    );
    Ok(())
}

/// Read a matrix written by [`save_binary`].
pub fn load_binary(path: &Path) -> Result<DMatrix> {
    let file = File::open(path)
        .map_err(|e| XGBoostError::engine(format!("failed to open {}: {}", path.display(), e)))?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic)?;
    if &magic != DMATRIX_MAGIC {
        return Err(XGBoostError::engine(format!(
            "{} is not a binary DMatrix cache",
            path.display()
        )));
    }

    let matrix: DMatrix = bincode::deserialize_from(&mut reader).map_err(|e| {
        XGBoostError::engine(format!("corrupt DMatrix cache {}: {}", path.display(), e))
    })?;
    matrix.check_consistency()?;
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FeatureType;
    use ndarray::array;

    #[test]
    fn test_round_trip_preserves_everything() {
        let mut dm = DMatrix::builder()
            .data(array![[1.0f32, f32::NAN], [3.0, 4.0]])
            .label(vec![1.0, 0.0])
            .weight(vec![0.5, 2.0])
            .feature_names(["alpha", "beta"])
            .feature_types(vec!["q", "i"])
            .build()
            .unwrap();
        dm.set_base_margin(&[0.1, -0.1]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dtest.buffer");
        save_binary(&dm, &path).unwrap();
        let loaded = load_binary(&path).unwrap();

        assert_eq!(loaded.num_row(), 2);
        assert_eq!(loaded.num_col(), 2);
        assert!(loaded.features()[[0, 1]].is_nan());
        assert_eq!(loaded.features()[[1, 0]], 3.0);
        assert_eq!(loaded.get_label(), dm.get_label());
        assert_eq!(loaded.get_weight(), dm.get_weight());
        assert_eq!(loaded.get_base_margin(), dm.get_base_margin());
        assert_eq!(loaded.feature_names(), dm.feature_names());
        assert_eq!(
            loaded.feature_types(),
            Some(&[FeatureType::Quantitative, FeatureType::Indicator][..])
        );
    }

    #[test]
    fn test_truncated_cache_is_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.buffer");
        std::fs::write(&path, b"XGDMAT01\x05\x00").unwrap();
        let err = load_binary(&path).unwrap_err();
        assert!(matches!(err, XGBoostError::Engine { .. }));
    }
}

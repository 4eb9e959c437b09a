// Example:
// let a = mat![1, 2, 3, 4; 5, 6, 7, 8; 9, 10, 11, 12];
// assert_eq!(a.dims(), (3, 4));
#[macro_export]
macro_rules! mat {
    [$( $( $x:expr ),* );*] => {{
        let rows: Vec<Vec<f64>> = vec![$( vec![$( $x as f64 ),*] ),*];
        let columns = rows.first().map_or(0, |row| row.len());
        assert!(rows.iter().all(|row| row.len() == columns), "mat!: rows differ in length");
        let n = rows.len();
        $crate::DynamicMatrix::<f64, $crate::RowMajor>::from_vec(n, columns,
            rows.into_iter().flat_map(|row| row.into_iter()).collect())
    }}
}

/// Asserts that two floating-point values agree to a relative tolerance (default `1e-6`).
#[macro_export]
macro_rules! assert_fp_eq {
    ($left:expr, $right:expr) => {
        assert_fp_eq!($left, $right, 1e-6)
    };
    ($left:expr, $right:expr, $tol:expr) => {{
        let (left, right, tol) = ($left as f64, $right as f64, $tol as f64);
        let scale = left.abs().max(right.abs()).max(1.0);
        if (left - right).abs() > tol * scale {
            panic!("assertion failed: `(left ~= right)`\n  left: `{:?}`,\n right: `{:?}`",
                left, right);
        }
    }};
}

/// Element-wise `assert_fp_eq!` over anything with a `to_vec()` (matrices in storage order,
/// vectors, `Vec`s).
#[macro_export]
macro_rules! assert_fpvec_eq {
    ($left:expr, $right:expr) => {
        assert_fpvec_eq!($left, $right, 1e-6)
    };
    ($left:expr, $right:expr, $tol:expr) => {{
        let (left, right) = ($left.to_vec(), $right.to_vec());
        assert_eq!(left.len(), right.len(), "length mismatch");
        for (l, r) in left.into_iter().zip(right.into_iter()) {
            assert_fp_eq!(l, r, $tol);
        }
    }};
}

#[cfg(test)]
mod tests {
    use dense::storage_order;
    use structure::Structure;
    use traits::{capabilities, MatrixExpr, RowMajor, StorageOrder};
    use DynamicMatrix;

    #[test]
    fn test_macro_row_major() {
        let a = mat![1, 2, 3, 4; 5, 6, 7, 8];
        assert_eq!(a.dims(), (2, 4));
        assert_eq!(storage_order(&a), StorageOrder::RowMajor);
        assert_eq!(capabilities::<DynamicMatrix<f64, RowMajor>>().order, StorageOrder::RowMajor);
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(a.at(1, 0), 5.0);
        assert_eq!(a.spacing(), 4);

        let b = mat![1, 2; 3.0, 4; 5.5, 6];
        assert_eq!(b.dims(), (3, 2));
        assert_eq!(b.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.5, 6.0]);
    }

    #[test]
    fn test_macro_values_are_shareable() {
        let mut a = mat![1, 2; 3, 4];
        let view = a.share();
        a.set(0, 1, 9.0).unwrap();
        assert_eq!(view.at(0, 1), 9.0);
        assert!(view.is_same(&a.alias_key()));

        let copy = a.clone();
        a.set(1, 1, 0.0).unwrap();
        assert_eq!(copy.at(1, 1), 4.0);
    }

    #[test]
    fn test_macro_structure() {
        assert_eq!(<DynamicMatrix<f64> as MatrixExpr>::STRUCTURE, Structure::GENERAL);
        assert!(Structure::SYMMETRIC.verify(&mat![1, 2; 2, 1]));
        assert!(!Structure::SYMMETRIC.verify(&mat![1, 2; 3, 1]));
        assert!(Structure::STRICTLY_UPPER.verify(&mat![0, 7, 1; 0, 0, 2; 0, 0, 0]));
    }

    #[test]
    #[should_panic(expected = "rows differ in length")]
    fn test_macro_ragged() {
        let _ = mat![1, 2; 3];
    }

    #[test]
    fn test_fp_macros() {
        assert_fp_eq!(1.0, 1.0 + 1e-9);
        assert_fp_eq!(1000.0f32, 1000.0001f32);
        assert_fpvec_eq!(mat![1, 2; 3, 4], vec![1.0, 2.0, 3.0, 4.0 + 1e-8]);
    }

    #[test]
    #[should_panic]
    fn test_fp_mismatch() {
        assert_fp_eq!(1.0, 1.01);
    }
}

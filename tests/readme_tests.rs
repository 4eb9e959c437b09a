// Set of tests that should mirror the examples in README

#[macro_use] extern crate wee_expr;
extern crate num;
extern crate rand;

use num::Complex;
use rand::SeedableRng;
use rand::rngs::StdRng;

use wee_expr::{evaluate, heev, ColumnMajor, CompressedMatrix, CompressedVector, DynamicMatrix,
    DynamicVector, MatrixExpr, Norm, StaticVector, SymmetricMatrix, VectorNorm};

#[test]
fn test_creation() {
    let a = mat![1, 2, 3, 4; 5, 6, 7, 8; 9, 10, 11, 12];
    assert_eq!(a.dims(), (3, 4));

    // from_vec takes values in the matrix's storage order
    let b = DynamicMatrix::<f64, ColumnMajor>::from_vec(3, 4,
        vec![1.0, 5.0, 9.0, 2.0, 6.0, 10.0, 3.0, 7.0, 11.0, 4.0, 8.0, 12.0]);
    assert_eq!(a, b);
}

#[test]
fn test_ones_zeros() {
    let a = DynamicMatrix::<f64>::ones(5, 4);
    assert_eq!(a.dims(), (5, 4));
    assert_eq!(a.get(0, 0).unwrap(), 1.0);
    assert_eq!(a.get(0, 3).unwrap(), 1.0);
    assert_eq!(a.get(4, 2).unwrap(), 1.0);
}

#[test]
fn test_random() {
    let mut rng = StdRng::seed_from_u64(0);
    let a = DynamicMatrix::<f64>::rand_with(&mut rng, 3, 2);
    assert_eq!(a.dims(), (3, 2));
    let s = CompressedMatrix::<f64>::rand_with(&mut rng, 10, 10, 7);
    assert!(s.non_zeros() <= 7);
    let h = SymmetricMatrix::<DynamicMatrix<f64>>::rand_with(&mut rng, 4);
    assert_eq!(h.at(1, 3), h.at(3, 1));
}

#[test]
fn test_ops() {
    let a = DynamicMatrix::<f64>::ones(2, 2);
    let b = DynamicMatrix::<f64>::ones(2, 2);

    // expressions are lazy until assigned or evaluated
    let e = (&a + &b).unwrap();
    assert_eq!(e.at(0, 0), 2.0);
    let mut c = DynamicMatrix::<f64>::zeros(0, 0);
    c.assign(&e).unwrap();
    assert_eq!(c.dims(), (2, 2));

    let d = evaluate(&(&c * &DynamicMatrix::<f64>::zeros(2, 2)).unwrap());
    assert_eq!(d.dims(), (2, 2));
    assert_eq!(d.get(0, 0).unwrap(), 0.0);

    c.sub_assign_expr(&(&a * 2.0)).unwrap();
    assert_eq!(c, DynamicMatrix::<f64>::zeros(2, 2));
}

#[test]
fn test_vectors() {
    let x = DynamicVector::<f64>::from_vec(vec![3.0, 4.0, 0.0]);
    let y = DynamicVector::<f64>::from_vec(vec![0.0, 0.0, 1.0]);
    let mut z = DynamicVector::<f64>::zeros(3);
    z.assign(&(&x % &y).unwrap()).unwrap();
    assert_eq!(z.to_vec(), vec![4.0, -3.0, 0.0]);
    assert_eq!(x.norm(Norm::L2), 5.0);
}

#[test]
fn test_sparse_and_static_vectors() {
    let s = CompressedVector::<f64>::from_pairs(3, &[(0, 2.0)]).unwrap();
    let v = StaticVector::<f64, 3>::new([1.0, 2.0, 3.0]);
    let outer = evaluate(&(&s * &v.trans()));
    assert_eq!(outer.dims(), (3, 3));
    assert_eq!(outer.to_vec(), vec![2.0, 4.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_eigenvalues() {
    let mut a = DynamicMatrix::<Complex<f64>>::diag(&[Complex::new(2.0, 0.0),
        Complex::new(-1.0, 0.0)]);
    let mut w = DynamicVector::<f64>::zeros(0);
    heev(&mut a, &mut w, b'V', b'L').unwrap();
    assert_eq!(w.to_vec(), vec![-1.0, 2.0]);
}

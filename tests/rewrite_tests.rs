// `(l op1 r) op2 x` with a dense container `x` is built as `(l op2 x) op1 r`.

#[macro_use] extern crate wee_expr;

use wee_expr::{evaluate, schur, AddExpr, CompressedMatrix, DynamicMatrix, DynamicVector,
    SchurExpr, StaticMatrix, SubExpr, VecAddExpr, VecSubExpr};

type M = DynamicMatrix<f64>;

#[test]
fn test_sub_then_add() {
    let a = mat![1, 2; 3, 4];
    let b = mat![4, 3; 2, 1];
    let c = mat![1, 0; 0, 1];

    let e: SubExpr<AddExpr<&M, &M>, &M> = ((&a - &b).unwrap() + &c).unwrap();
    assert_eq!(evaluate(&e), mat![-2, -1; 1, 4]);
}

#[test]
fn test_all_sign_combinations() {
    let a = mat![1, 2; 3, 4];
    let b = mat![4, 3; 2, 1];
    let c = mat![10, 20; 30, 40];

    let e: AddExpr<AddExpr<&M, &M>, &M> = ((&a + &b).unwrap() + &c).unwrap();
    assert_eq!(evaluate(&e), mat![15, 25; 35, 45]);

    let e: AddExpr<SubExpr<&M, &M>, &M> = ((&a + &b).unwrap() - &c).unwrap();
    assert_eq!(evaluate(&e), mat![-5, -15; -25, -35]);

    let e: SubExpr<SubExpr<&M, &M>, &M> = ((&a - &b).unwrap() - &c).unwrap();
    assert_eq!(evaluate(&e), mat![-13, -21; -29, -37]);
}

#[test]
fn test_nested_restructuring() {
    let a = mat![1, 1; 1, 1];
    let b = mat![2, 2; 2, 2];
    let c = mat![3, 3; 3, 3];
    let d = mat![4, 4; 4, 4];

    // ((a - b) + c) - d  =>  ((a + c) - b) - d  =>  ((a + c) - d) - b
    let e: SubExpr<SubExpr<AddExpr<&M, &M>, &M>, &M> =
        (((&a - &b).unwrap() + &c).unwrap() - &d).unwrap();
    assert_eq!(evaluate(&e), mat![-2, -2; -2, -2]);
}

#[test]
fn test_static_container_is_dense_leaf() {
    let a = mat![1, 2; 3, 4];
    let b = mat![1, 1; 1, 1];
    let s = StaticMatrix::<f64, 2, 2>::new([[5.0, 5.0], [5.0, 5.0]]);

    let e: SubExpr<AddExpr<&M, &StaticMatrix<f64, 2, 2>>, &M> =
        ((&a - &b).unwrap() + &s).unwrap();
    assert_eq!(evaluate(&e), mat![5, 6; 7, 8]);
}

#[test]
fn test_not_restructured() {
    let a = mat![1, 2; 3, 4];
    let b = mat![2, 2; 2, 2];
    let c = mat![1, 0; 0, 1];
    let s = CompressedMatrix::<f64>::from_triplets(2, 2, &[(1, 1, 5.0)]).unwrap();

    // sparse right operand
    let e: AddExpr<SubExpr<&M, &M>, &CompressedMatrix<f64>> =
        ((&a - &b).unwrap() + &s).unwrap();
    assert_eq!(evaluate(&e), mat![-1, 0; 1, 7]);

    // Schur products are not additive nodes
    let e: AddExpr<SchurExpr<&M, &M>, &M> = (schur(&a, &b).unwrap() + &c).unwrap();
    assert_eq!(evaluate(&e), mat![3, 4; 6, 9]);

    // expression right operand
    let e = ((&a - &b).unwrap() + (&c + &c).unwrap()).unwrap();
    let _: &AddExpr<SubExpr<&M, &M>, AddExpr<&M, &M>> = &e;
    assert_eq!(evaluate(&e), mat![1, 0; 1, 4]);
}

#[test]
fn test_vector_restructuring() {
    let x = DynamicVector::<f64>::from_vec(vec![1.0, 2.0]);
    let y = DynamicVector::<f64>::from_vec(vec![3.0, 5.0]);
    let z = DynamicVector::<f64>::from_vec(vec![10.0, 10.0]);
    type V = DynamicVector<f64>;

    let e: VecSubExpr<VecAddExpr<&V, &V>, &V> = ((&x - &y).unwrap() + &z).unwrap();
    let mut out = DynamicVector::<f64>::zeros(2);
    out.assign(&e).unwrap();
    assert_eq!(out.to_vec(), vec![8.0, 7.0]);
}

#[test]
fn test_mismatch_in_restructured_operand() {
    let a = mat![1, 2; 3, 4];
    let b = mat![1, 1; 1, 1];
    let c = DynamicMatrix::<f64>::zeros(3, 3);
    let err = ((&a - &b).unwrap() + &c).unwrap_err();
    assert!(err.is_invalid_argument());
}

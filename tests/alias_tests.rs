// Assignments whose target also appears inside the expression. The target is referenced through
// a shared handle (`share()`), which views the same storage.

extern crate env_logger;
extern crate rand;
#[macro_use] extern crate wee_expr;

use rand::SeedableRng;
use rand::rngs::StdRng;

use wee_expr::{schur, trans, AliasVerdict, ColumnMajor, CompressedMatrix, Concurrency, Config,
    DynamicMatrix, DynamicVector, MatrixExpr, Order, RowMajor, VectorExpr};
use wee_expr::alias::analyze;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn configs() -> Vec<Config> {
    vec![
        Config::serial(),
        Config::default().with_concurrency(Concurrency::Smp).with_smp_threshold(0),
    ]
}

fn reference<F: Fn(usize, usize) -> f64>(n: usize, f: F) -> DynamicMatrix<f64> {
    DynamicMatrix::from_fn(n, n, f)
}

#[test]
fn test_target_minus_other() {
    init();
    for config in &configs() {
        let mut t = mat![1, 2; 3, 4];
        let r = mat![1, 1; 1, 1];
        let alias = t.share();

        let e = (&alias - &r).unwrap();
        assert_eq!(analyze(&t.alias_key(), &e), AliasVerdict::InPlace);
        t.assign_with(&e, config).unwrap();
        assert_eq!(t, mat![0, 1; 2, 3]);

        t.add_assign_expr_with(&e, config).unwrap();
        assert_eq!(t, mat![-1, 1; 3, 5]);

        t.sub_assign_expr_with(&e, config).unwrap();
        assert_eq!(t, mat![1, 1; 1, 1]);
    }
}

#[test]
fn test_transposed_target_minus_other() {
    init();
    for config in &configs() {
        let mut t = mat![1, 2, 3; 4, 5, 6; 7, 8, 9];
        let r = DynamicMatrix::<f64, ColumnMajor>::eye(3);
        let view = t.trans();
        let expected = reference(3, |i, j| t.at(j, i) - r.at(i, j));

        let e = (&view - &r).unwrap();
        assert_eq!(analyze(&t.alias_key(), &e), AliasVerdict::Overlapping);
        t.assign_with(&e, config).unwrap();
        assert_eq!(t, expected);
    }
}

#[test]
fn test_other_minus_target() {
    init();
    for config in &configs() {
        let mut t = mat![1, 2; 3, 4];
        let r = mat![10, 10; 10, 10];
        let alias = t.share();

        t.assign_with(&(&r - &alias).unwrap(), config).unwrap();
        assert_eq!(t, mat![9, 8; 7, 6]);
    }
}

#[test]
fn test_target_times_other() {
    init();
    for config in &configs() {
        let mut t = mat![1, 2; 3, 4];
        let r = mat![0, 1; 1, 0];
        let alias = t.share();

        t.assign_with(&(&alias * &r).unwrap(), config).unwrap();
        assert_eq!(t, mat![2, 1; 4, 3]);

        // t += r * t
        t.add_assign_expr_with(&(&r * &alias).unwrap(), config).unwrap();
        assert_eq!(t, mat![6, 4; 6, 4]);
    }
}

#[test]
fn test_restructured_with_target() {
    init();
    let mut t = mat![1, 2; 3, 4];
    let r = mat![1, 1; 1, 1];
    let alias = t.share();

    // built as (t + t) - r
    t.assign(&((&alias - &r).unwrap() + &alias).unwrap()).unwrap();
    assert_eq!(t, mat![1, 3; 5, 7]);
}

#[test]
fn test_random_aliasing_matches_reference() {
    init();
    let mut rng = StdRng::seed_from_u64(11);
    for config in &configs() {
        let mut t = DynamicMatrix::<f64, RowMajor>::rand_with(&mut rng, 9, 9);
        let r = DynamicMatrix::<f64, ColumnMajor>::rand_with(&mut rng, 9, 9);
        let before = t.clone();
        let alias = t.share();

        // t = r - trans(t) + t
        let e = ((&r - trans(&alias)).unwrap() + &alias).unwrap();
        t.assign_with(&e, config).unwrap();
        let expected = reference(9, |i, j| r.at(i, j) - before.at(j, i) + before.at(i, j));
        assert_fpvec_eq!(t, expected);
    }
}

#[test]
fn test_sparse_target() {
    init();
    for config in &configs() {
        let mut s = CompressedMatrix::<f64>::from_triplets(3, 3,
            &[(0, 0, 1.0), (1, 2, 2.0), (2, 1, -3.0)]).unwrap();
        let d = mat![1, 0, 0; 0, 1, 0; 0, 0, 1];
        let alias = s.share();

        s.assign_with(&(&alias - &d).unwrap(), config).unwrap();
        assert_eq!(s.get(0, 0).unwrap(), 0.0);
        assert_eq!(s.get(1, 1).unwrap(), -1.0);
        assert_eq!(s.get(1, 2).unwrap(), 2.0);
        assert_eq!(s.non_zeros(), 4);

        s.assign_with(&(&d - &alias).unwrap(), config).unwrap();
        assert_eq!(s.get(1, 1).unwrap(), 2.0);
        assert_eq!(s.get(2, 1).unwrap(), 3.0);

        let p = mat![0, 1, 0; 1, 0, 0; 0, 0, 1];
        let before = s.clone();
        s.assign_with(&(&alias * &p).unwrap(), config).unwrap();
        for i in 0..3 {
            assert_eq!(s.get(i, 0).unwrap(), before.get(i, 1).unwrap());
            assert_eq!(s.get(i, 1).unwrap(), before.get(i, 0).unwrap());
            assert_eq!(s.get(i, 2).unwrap(), before.get(i, 2).unwrap());
        }
    }
}

fn assert_sparse_matches<O: Order, F: Fn(usize, usize) -> f64>(s: &CompressedMatrix<f64, O>,
        expected: F, label: &str) {
    for i in 0..s.rows() {
        for j in 0..s.columns() {
            let (got, want) = (s.at(i, j), expected(i, j));
            assert!((got - want).abs() <= 1e-12 * (1.0 + want.abs()),
                "{} at ({}, {}): got {}, expected {}", label, i, j, got, want);
        }
    }
}

fn sparse_aliased_operands<O: Order>(seed: u64) {
    init();
    let mut rng = StdRng::seed_from_u64(seed);
    for config in &configs() {
        let d = DynamicMatrix::<f64, ColumnMajor>::rand_with(&mut rng, 6, 6);
        let u = CompressedMatrix::<f64, RowMajor>::rand_with(&mut rng, 6, 6, 8);

        // aliased right operand under compound assignment
        let mut s = CompressedMatrix::<f64, O>::rand_with(&mut rng, 6, 6, 10);
        let before = s.clone();
        let alias = s.share();
        s.add_assign_expr_with(&(&d - &alias).unwrap(), config).unwrap();
        assert_sparse_matches(&s, |i, j| before.at(i, j) + (d.at(i, j) - before.at(i, j)),
            "s += d - s");

        let before = s.clone();
        s.sub_assign_expr_with(&(&u - &alias).unwrap(), config).unwrap();
        assert_sparse_matches(&s, |i, j| before.at(i, j) - (u.at(i, j) - before.at(i, j)),
            "s -= u - s");

        // transposed view of the target
        let before = s.clone();
        s.assign_with(&(trans(&alias) - &d).unwrap(), config).unwrap();
        assert_sparse_matches(&s, |i, j| before.at(j, i) - d.at(i, j), "s = trans(s) - d");

        let before = s.clone();
        s.add_assign_expr_with(&trans(&alias), config).unwrap();
        assert_sparse_matches(&s, |i, j| before.at(i, j) + before.at(j, i), "s += trans(s)");

        // element-wise and matrix products with the target
        let before = s.clone();
        s.assign_with(&schur(&alias, &d).unwrap(), config).unwrap();
        assert_sparse_matches(&s, |i, j| before.at(i, j) * d.at(i, j), "s = s % d");

        let before = s.clone();
        s.sub_assign_expr_with(&schur(&u, &alias).unwrap(), config).unwrap();
        assert_sparse_matches(&s, |i, j| before.at(i, j) - u.at(i, j) * before.at(i, j),
            "s -= u % s");

        let before = s.clone();
        s.assign_with(&(&alias * &d).unwrap(), config).unwrap();
        assert_sparse_matches(&s,
            |i, j| (0..6).fold(0.0, |acc, k| acc + before.at(i, k) * d.at(k, j)), "s = s * d");

        let before = s.clone();
        s.add_assign_expr_with(&(&u * &alias).unwrap(), config).unwrap();
        assert_sparse_matches(&s,
            |i, j| before.at(i, j) + (0..6).fold(0.0, |acc, k| acc + u.at(i, k) * before.at(k, j)),
            "s += u * s");
    }
}

#[test]
fn test_sparse_target_aliased_operands_row_major() {
    sparse_aliased_operands::<RowMajor>(21);
}

#[test]
fn test_sparse_target_aliased_operands_column_major() {
    sparse_aliased_operands::<ColumnMajor>(22);
}

#[test]
fn test_matrix_vector_aliasing() {
    init();
    let a = mat![0, 1; 1, 0];
    let mut v = DynamicVector::<f64>::from_vec(vec![3.0, 5.0]);
    let alias = v.share();

    let e = (&a * &alias).unwrap();
    assert!(e.is_aliased(&v.alias_key()));
    v.assign(&e).unwrap();
    assert_eq!(v.to_vec(), vec![5.0, 3.0]);
}

//! Lazily evaluated dense and sparse matrix/vector expressions.
//!
//! Arithmetic on containers builds expression nodes instead of computing results. A node is
//! evaluated when it is assigned to a target, where the assignment dispatcher picks the kernel
//! (dense or sparse target, serial or parallel, direct or through a temporary when the target
//! also appears as an operand).
//!
//! ```
//! #[macro_use] extern crate wee_expr;
//! use wee_expr::DynamicMatrix;
//!
//! # fn main() {
//! let a = mat![1, 2; 3, 4];
//! let b = mat![1, 1; 1, 1];
//! let mut c = DynamicMatrix::<f64>::zeros(2, 2);
//! c.assign(&(&a - &b).unwrap()).unwrap();
//! assert_eq!(c, mat![0, 1; 2, 3]);
//! # }
//! ```

#[cfg(feature = "blas")] extern crate blas;
#[cfg(feature = "lapack")] extern crate lapack;
extern crate num;
extern crate rand;
extern crate rayon;
#[macro_use] extern crate log;
#[macro_use] extern crate error_chain;

#[macro_use] mod macro_def;

mod errors;
pub use errors::{Error, ErrorKind, Result};

pub mod element;
pub use element::Element;

pub mod structure;
pub use structure::{OpKind, Structure};

pub mod traits;
pub use traits::{evaluate, capabilities, Capabilities, ColumnMajor, ColumnVector, Dense,
    ElementMut, FromExpr, MatrixExpr, MatrixReader, Order, ResultType, RowMajor, RowVector,
    Sparse, StorageKind, StorageOrder, TransposeFlag, VectorExpr, VectorReader};

pub mod alias;
pub use alias::{AliasKey, AliasVerdict};

pub mod config;
pub use config::{Concurrency, Config};

pub mod dispatch;
pub use dispatch::{AssignMode, AssignTarget, VectorTarget};

mod dense;
pub use dense::DynamicMatrix;

mod sparse;
pub use sparse::CompressedMatrix;

mod static_matrix;
pub use static_matrix::StaticMatrix;

mod vector;
pub use vector::DynamicVector;

mod static_vector;
pub use static_vector::StaticVector;

mod sparse_vector;
pub use sparse_vector::CompressedVector;

pub mod binary;
pub use binary::{schur, AddExpr, BinaryExpr, SchurExpr, SubExpr};

pub mod unary;
pub use unary::{declsym, trans, DeclSymExpr, ScaleExpr, TransExpr};

mod map;
pub use map::{map, MapExpr};

pub mod product;
pub use product::{inner, MatVecExpr, MultExpr, OuterExpr};

pub mod vecexpr;
pub use vecexpr::{cross, CrossExpr, VecAddExpr, VecBinaryExpr, VecScaleExpr, VecSchurExpr,
    VecSubExpr};

pub mod adaptor;
pub use adaptor::{Adaptor, AdaptorKind, DiagonalMatrix, HermitianMatrix, IdentityMatrix,
    LowerMatrix, StrictlyLowerMatrix, StrictlyUpperMatrix, SymmetricMatrix, UniLowerMatrix,
    UniUpperMatrix, UpperMatrix};

pub mod ops;

mod eigen;
pub use eigen::{heev, syev, Real};

mod norm;
pub use norm::{MatNorm, MatrixNorm, Norm, VectorNorm};

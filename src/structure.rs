//! Structural properties of matrices and how they propagate through operations.
//!
//! Every matrix type and expression carries a [`Structure`](struct.Structure.html) as an
//! associated constant. The propagation functions are `const fn`, so the structure of an
//! arbitrarily nested expression is a compile-time fact.

use num::{One, Zero};

use element::Element;
use traits::{MatrixExpr, MatrixReader};

/// Kind of element-wise binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Plus,
    Minus,
    Schur,
}

/// Set of structural claims about a square-or-not matrix. A `false` flag means "not known", never
/// "known not to hold".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Structure {
    pub symmetric: bool,
    pub hermitian: bool,
    pub lower: bool,
    pub uni_lower: bool,
    pub strictly_lower: bool,
    pub upper: bool,
    pub uni_upper: bool,
    pub strictly_upper: bool,
}

const NONE: Structure = Structure {
    symmetric: false,
    hermitian: false,
    lower: false,
    uni_lower: false,
    strictly_lower: false,
    upper: false,
    uni_upper: false,
    strictly_upper: false,
};

impl Structure {
    pub const GENERAL: Structure = NONE;
    pub const SYMMETRIC: Structure = Structure { symmetric: true, ..NONE };
    pub const HERMITIAN: Structure = Structure { hermitian: true, ..NONE };
    pub const LOWER: Structure = Structure { lower: true, ..NONE };
    pub const UNI_LOWER: Structure = Structure { lower: true, uni_lower: true, ..NONE };
    pub const STRICTLY_LOWER: Structure = Structure {
        lower: true,
        strictly_lower: true,
        ..NONE
    };
    pub const UPPER: Structure = Structure { upper: true, ..NONE };
    pub const UNI_UPPER: Structure = Structure { upper: true, uni_upper: true, ..NONE };
    pub const STRICTLY_UPPER: Structure = Structure {
        upper: true,
        strictly_upper: true,
        ..NONE
    };
    pub const DIAGONAL: Structure = Structure {
        symmetric: true,
        lower: true,
        upper: true,
        ..NONE
    };
    pub const IDENTITY: Structure = Structure {
        symmetric: true,
        hermitian: true,
        lower: true,
        uni_lower: true,
        upper: true,
        uni_upper: true,
        ..NONE
    };

    pub const fn is_diagonal(self) -> bool {
        self.lower && self.upper
    }
    pub const fn is_identity(self) -> bool {
        self.uni_lower && self.uni_upper
    }

    /// Adds every claim implied by the ones already present.
    pub const fn normalized(self) -> Structure {
        let lower = self.lower || self.uni_lower || self.strictly_lower;
        let upper = self.upper || self.uni_upper || self.strictly_upper;
        let identity = self.uni_lower && self.uni_upper;
        let zero = self.strictly_lower && self.strictly_upper;
        Structure {
            symmetric: self.symmetric || (lower && upper),
            hermitian: self.hermitian || identity || zero,
            lower,
            uni_lower: self.uni_lower,
            strictly_lower: self.strictly_lower,
            upper,
            uni_upper: self.uni_upper,
            strictly_upper: self.strictly_upper,
        }
    }

    /// Structure of `l + r`.
    pub const fn add(l: Structure, r: Structure) -> Structure {
        let (l, r) = (l.normalized(), r.normalized());
        Structure {
            symmetric: l.symmetric && r.symmetric,
            hermitian: l.hermitian && r.hermitian,
            lower: l.lower && r.lower,
            uni_lower: (l.uni_lower && r.strictly_lower) || (l.strictly_lower && r.uni_lower),
            strictly_lower: l.strictly_lower && r.strictly_lower,
            upper: l.upper && r.upper,
            uni_upper: (l.uni_upper && r.strictly_upper) || (l.strictly_upper && r.uni_upper),
            strictly_upper: l.strictly_upper && r.strictly_upper,
        }.normalized()
    }

    /// Structure of `l - r`.
    pub const fn sub(l: Structure, r: Structure) -> Structure {
        let (l, r) = (l.normalized(), r.normalized());
        Structure {
            symmetric: l.symmetric && r.symmetric,
            hermitian: l.hermitian && r.hermitian,
            lower: l.lower && r.lower,
            uni_lower: l.uni_lower && r.strictly_lower,
            strictly_lower: l.strictly_lower && r.strictly_lower,
            upper: l.upper && r.upper,
            uni_upper: l.uni_upper && r.strictly_upper,
            strictly_upper: l.strictly_upper && r.strictly_upper,
        }.normalized()
    }

    /// Structure of the element-wise (Schur) product.
    pub const fn schur(l: Structure, r: Structure) -> Structure {
        let (l, r) = (l.normalized(), r.normalized());
        Structure {
            symmetric: l.symmetric && r.symmetric,
            hermitian: l.hermitian && r.hermitian,
            lower: l.lower || r.lower,
            uni_lower: l.uni_lower && r.uni_lower,
            strictly_lower: l.strictly_lower || r.strictly_lower,
            upper: l.upper || r.upper,
            uni_upper: l.uni_upper && r.uni_upper,
            strictly_upper: l.strictly_upper || r.strictly_upper,
        }.normalized()
    }

    /// Structure of the matrix product `l * r`.
    pub const fn mult(l: Structure, r: Structure) -> Structure {
        let (l, r) = (l.normalized(), r.normalized());
        let diagonal = l.is_diagonal() && r.is_diagonal();
        Structure {
            symmetric: diagonal,
            hermitian: diagonal && l.hermitian && r.hermitian,
            lower: l.lower && r.lower,
            uni_lower: l.uni_lower && r.uni_lower,
            strictly_lower: (l.strictly_lower && r.lower) || (l.lower && r.strictly_lower),
            upper: l.upper && r.upper,
            uni_upper: l.uni_upper && r.uni_upper,
            strictly_upper: (l.strictly_upper && r.upper) || (l.upper && r.strictly_upper),
        }.normalized()
    }

    /// Structure after scaling by a scalar (or negation).
    pub const fn scale(s: Structure, complex_scalar: bool) -> Structure {
        let s = s.normalized();
        Structure {
            symmetric: s.symmetric,
            hermitian: s.hermitian && !complex_scalar,
            lower: s.lower,
            uni_lower: false,
            strictly_lower: s.strictly_lower,
            upper: s.upper,
            uni_upper: false,
            strictly_upper: s.strictly_upper,
        }.normalized()
    }

    /// Structure of the transpose.
    pub const fn trans(s: Structure) -> Structure {
        let s = s.normalized();
        Structure {
            symmetric: s.symmetric,
            hermitian: s.hermitian,
            lower: s.upper,
            uni_lower: s.uni_upper,
            strictly_lower: s.strictly_upper,
            upper: s.lower,
            uni_upper: s.uni_lower,
            strictly_upper: s.strictly_lower,
        }
    }

    /// Structure of an expression declared symmetric by the caller.
    pub const fn declsym(s: Structure) -> Structure {
        Structure { symmetric: true, ..s.normalized() }.normalized()
    }

    pub const fn elementwise(kind: OpKind, l: Structure, r: Structure) -> Structure {
        match kind {
            OpKind::Plus => Structure::add(l, r),
            OpKind::Minus => Structure::sub(l, r),
            OpKind::Schur => Structure::schur(l, r),
        }
    }

    /// True if every claim of `other` is also a claim of `self`.
    pub const fn implies(self, other: Structure) -> bool {
        let (s, o) = (self.normalized(), other.normalized());
        (s.symmetric || !o.symmetric)
            && (s.hermitian || !o.hermitian)
            && (s.lower || !o.lower)
            && (s.uni_lower || !o.uni_lower)
            && (s.strictly_lower || !o.strictly_lower)
            && (s.upper || !o.upper)
            && (s.uni_upper || !o.uni_upper)
            && (s.strictly_upper || !o.strictly_upper)
    }

    /// Checks the claims against actual matrix values.
    pub fn verify<E: MatrixExpr>(self, e: &E) -> bool {
        let s = self.normalized();
        if s == Structure::GENERAL {
            return true;
        }
        let (m, n) = (e.rows(), e.columns());
        if m != n {
            return false;
        }
        let (zero, one) = (E::Elem::zero(), E::Elem::one());
        let e = e.reader();
        for i in 0..n {
            for j in 0..n {
                let v = e.get(i, j);
                if s.symmetric && v != e.get(j, i) { return false; }
                if s.hermitian && v != e.get(j, i).conjugate() { return false; }
                if s.lower && j > i && v != zero { return false; }
                if s.upper && i > j && v != zero { return false; }
                if i == j {
                    if (s.uni_lower || s.uni_upper) && v != one { return false; }
                    if (s.strictly_lower || s.strictly_upper) && v != zero { return false; }
                }
            }
        }
        true
    }
}

/// `max` usable in constant expressions, for static extents.
pub const fn max_extent(a: usize, b: usize) -> usize {
    if a > b { a } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Structure; 11] = [
        Structure::GENERAL,
        Structure::SYMMETRIC,
        Structure::HERMITIAN,
        Structure::LOWER,
        Structure::UNI_LOWER,
        Structure::STRICTLY_LOWER,
        Structure::UPPER,
        Structure::UNI_UPPER,
        Structure::STRICTLY_UPPER,
        Structure::DIAGONAL,
        Structure::IDENTITY,
    ];

    #[test]
    fn test_sub_rules() {
        for &l in ALL.iter() {
            for &r in ALL.iter() {
                let (ln, rn) = (l.normalized(), r.normalized());
                let s = Structure::sub(l, r);
                assert_eq!(s.symmetric, ln.symmetric && rn.symmetric);
                assert_eq!(s.lower, ln.lower && rn.lower);
                assert_eq!(s.upper, ln.upper && rn.upper);
                assert_eq!(s.strictly_lower, ln.strictly_lower && rn.strictly_lower);
                assert_eq!(s.strictly_upper, ln.strictly_upper && rn.strictly_upper);
                assert_eq!(s.uni_lower, ln.uni_lower && rn.strictly_lower);
                assert_eq!(s.uni_upper, ln.uni_upper && rn.strictly_upper);
            }
        }
    }

    #[test]
    fn test_sub_lower() {
        let s = Structure::sub(Structure::LOWER, Structure::LOWER);
        assert!(s.lower);
        let s = Structure::sub(Structure::LOWER, Structure::GENERAL);
        assert!(!s.lower);
        let s = Structure::sub(Structure::SYMMETRIC, Structure::LOWER);
        assert!(!s.lower);
        assert!(!s.symmetric);
    }

    #[test]
    fn test_sub_strictly_lower() {
        let s = Structure::sub(Structure::STRICTLY_LOWER, Structure::STRICTLY_LOWER);
        assert!(s.strictly_lower);
        assert!(s.lower);
        assert!(!s.uni_lower);
        assert!(!s.upper);
    }

    #[test]
    fn test_uni_lower_minus_strictly_lower() {
        let s = Structure::sub(Structure::UNI_LOWER, Structure::STRICTLY_LOWER);
        assert!(s.uni_lower);
        assert!(s.lower);
        let s = Structure::sub(Structure::STRICTLY_LOWER, Structure::UNI_LOWER);
        assert!(!s.uni_lower);
        assert!(s.lower);
    }

    #[test]
    fn test_add_uni_lower_commutes() {
        let a = Structure::add(Structure::UNI_LOWER, Structure::STRICTLY_LOWER);
        let b = Structure::add(Structure::STRICTLY_LOWER, Structure::UNI_LOWER);
        assert!(a.uni_lower);
        assert_eq!(a, b);
        assert!(!Structure::add(Structure::UNI_LOWER, Structure::UNI_LOWER).uni_lower);
    }

    #[test]
    fn test_hermitian_symmetric() {
        let s = Structure::add(Structure::HERMITIAN, Structure::HERMITIAN);
        assert!(s.hermitian);
        assert!(!s.symmetric);
        let s = Structure::sub(Structure::HERMITIAN, Structure::SYMMETRIC);
        assert!(!s.hermitian);
    }

    #[test]
    fn test_diagonal_normalization() {
        let s = Structure::add(Structure::DIAGONAL, Structure::DIAGONAL);
        assert!(s.symmetric && s.lower && s.upper);
        let s = Structure::sub(Structure::IDENTITY, Structure::DIAGONAL);
        assert!(s.is_diagonal());
        assert!(!s.uni_lower);
    }

    #[test]
    fn test_mult_rules() {
        let s = Structure::mult(Structure::LOWER, Structure::STRICTLY_LOWER);
        assert!(s.lower);
        assert!(s.strictly_lower);
        let s = Structure::mult(Structure::UNI_UPPER, Structure::UNI_UPPER);
        assert!(s.uni_upper);
        let s = Structure::mult(Structure::SYMMETRIC, Structure::SYMMETRIC);
        assert!(!s.symmetric);
        let s = Structure::mult(Structure::DIAGONAL, Structure::DIAGONAL);
        assert!(s.symmetric);
        assert!(!s.hermitian);
        let s = Structure::mult(Structure::IDENTITY, Structure::IDENTITY);
        assert!(s.hermitian);
    }

    #[test]
    fn test_scale_drops_unit_diagonal() {
        let s = Structure::scale(Structure::UNI_LOWER, false);
        assert!(s.lower);
        assert!(!s.uni_lower);
        assert!(Structure::scale(Structure::HERMITIAN, false).hermitian);
        assert!(!Structure::scale(Structure::HERMITIAN, true).hermitian);
    }

    #[test]
    fn test_trans_swaps_triangles() {
        let s = Structure::trans(Structure::STRICTLY_LOWER);
        assert!(s.strictly_upper && s.upper);
        assert!(!s.lower);
        assert_eq!(Structure::trans(Structure::trans(Structure::UNI_LOWER)),
            Structure::UNI_LOWER.normalized());
    }

    #[test]
    fn test_schur_rules() {
        let s = Structure::schur(Structure::LOWER, Structure::GENERAL);
        assert!(s.lower);
        let s = Structure::schur(Structure::LOWER, Structure::UPPER);
        assert!(s.is_diagonal());
    }

    #[test]
    fn test_general_is_weakest() {
        for &s in ALL.iter() {
            assert!(s.implies(Structure::GENERAL));
            assert_eq!(Structure::add(s, Structure::GENERAL).lower, false);
        }
        assert!(Structure::IDENTITY.implies(Structure::DIAGONAL));
        assert!(!Structure::LOWER.implies(Structure::STRICTLY_LOWER));
    }

    #[test]
    fn test_idempotent() {
        let a = Structure::sub(Structure::UNI_LOWER, Structure::STRICTLY_LOWER);
        let b = Structure::sub(Structure::UNI_LOWER, Structure::STRICTLY_LOWER);
        assert_eq!(a, b);
        assert_eq!(a.normalized(), a.normalized().normalized());
    }

    #[test]
    fn test_declsym() {
        assert!(Structure::declsym(Structure::GENERAL).implies(Structure::SYMMETRIC));
        let s = Structure::declsym(Structure::LOWER);
        assert!(s.symmetric && s.lower);
        assert!(!Structure::declsym(Structure::GENERAL).implies(Structure::HERMITIAN));
    }

    #[test]
    fn test_const_evaluation() {
        const S: Structure = Structure::sub(Structure::STRICTLY_LOWER, Structure::STRICTLY_LOWER);
        assert!(S.strictly_lower);
        const M: usize = max_extent(3, 0);
        assert_eq!(M, 3);
    }
}

//! Kernel registration table.
//!
//! Pure data binding each kernel's name, gufunc signature, description and
//! arities to its raw loop entry point, for callers that dispatch by name
//! and element type. The loops themselves live in `kernels`; only f64 is
//! instantiated here.

use crate::kernels;
use crate::Numerics;

/// Element types a kernel loop can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemType {
    F64,
}

/// Raw loop entry point; see the `kernels` module docs for the
/// `args`/`dims`/`steps` convention.
pub type GufuncLoop =
    unsafe fn(args: &[*mut f64], dims: &[usize], steps: &[isize], nbatch: usize, nc: &Numerics<f64>);

/// One registered kernel: metadata plus its loop.
#[derive(Debug, Clone, Copy)]
pub struct KernelDescriptor {
    /// Callable name.
    pub name: &'static str,
    /// Gufunc core-dimension signature.
    pub signature: &'static str,
    /// Human-readable description.
    pub doc: &'static str,
    /// Number of element-type instantiations.
    pub ntypes: usize,
    /// Number of input operands.
    pub nin: usize,
    /// Number of output operands.
    pub nout: usize,
    /// The f64 loop.
    pub loop_fn: GufuncLoop,
}

static DESCRIPTORS: [KernelDescriptor; 4] = [
    KernelDescriptor {
        name: "pdist_ratio",
        signature: "(d,m),(d,n)->(),()",
        doc: "Minimum and maximum ratio of pairwise distances between \
              corresponding pairs of points in two sets.",
        ntypes: 1,
        nin: 2,
        nout: 2,
        loop_fn: kernels::pdist_ratio_loop::<f64>,
    },
    KernelDescriptor {
        name: "cdist_ratio",
        signature: "(d1,m),(d2,m),(d1,n),(d2,n)->(),()",
        doc: "Minimum and maximum ratio of cross-wise distances between \
              corresponding pairs of points in two groups of two sets.",
        ntypes: 1,
        nin: 4,
        nout: 2,
        loop_fn: kernels::cdist_ratio_loop::<f64>,
    },
    KernelDescriptor {
        name: "matmul",
        signature: "(m,n),(n,p)->(m,p)",
        doc: "Matrix-matrix product.",
        ntypes: 1,
        nin: 2,
        nout: 1,
        loop_fn: kernels::matmul_loop::<f64>,
    },
    KernelDescriptor {
        name: "norm",
        signature: "(n)->()",
        doc: "Euclidean norm of a vector.",
        ntypes: 1,
        nin: 1,
        nout: 1,
        loop_fn: kernels::norm_loop::<f64>,
    },
];

/// All registered kernels.
pub fn descriptors() -> &'static [KernelDescriptor] {
    &DESCRIPTORS
}

/// Look up a kernel by name and element type.
pub fn find(name: &str, ty: ElemType) -> Option<&'static KernelDescriptor> {
    match ty {
        ElemType::F64 => DESCRIPTORS.iter().find(|d| d.name == name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_contents() {
        let names: Vec<&str> = descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, ["pdist_ratio", "cdist_ratio", "matmul", "norm"]);

        let pdist = find("pdist_ratio", ElemType::F64).unwrap();
        assert_eq!(pdist.signature, "(d,m),(d,n)->(),()");
        assert_eq!((pdist.ntypes, pdist.nin, pdist.nout), (1, 2, 2));

        let cdist = find("cdist_ratio", ElemType::F64).unwrap();
        assert_eq!(cdist.signature, "(d1,m),(d2,m),(d1,n),(d2,n)->(),()");
        assert_eq!((cdist.nin, cdist.nout), (4, 2));

        let matmul = find("matmul", ElemType::F64).unwrap();
        assert_eq!(matmul.signature, "(m,n),(n,p)->(m,p)");
        assert_eq!((matmul.nin, matmul.nout), (2, 1));

        let norm = find("norm", ElemType::F64).unwrap();
        assert_eq!(norm.signature, "(n)->()");
        assert_eq!((norm.nin, norm.nout), (1, 1));

        assert!(find("nosuchkernel", ElemType::F64).is_none());
    }

    #[test]
    fn test_dispatch_through_table() {
        let nc = Numerics::new();
        let x = [3.0f64, 4.0];
        let mut out = [0.0f64];
        let args = [x.as_ptr() as *mut f64, out.as_mut_ptr()];
        let norm = find("norm", ElemType::F64).unwrap();
        unsafe { (norm.loop_fn)(&args, &[2], &[1], 0, &nc) };
        assert_eq!(out[0], 5.0);
    }
}

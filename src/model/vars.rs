use std::ops::Range;

use ndarray::{Array, Array2, Array3, Dimension};
use typed_index_collections::{TiSlice, TiVec};

use super::{VarId, VarKind, VarType, VariableDef};

pub trait AddVars {
    type Out;

    /// Declare one variable per index in `self`, named `{base_name}_{index}`
    fn vars(
        &self,
        store: &mut TiVec<VarId, VariableDef>,
        base_name: &str,
        kind: VarKind,
        vtype: VarType,
        bounds: &Range<f64>,
    ) -> Self::Out;

    /// Non-negative integer variables
    fn integer(
        &self,
        store: &mut TiVec<VarId, VariableDef>,
        base_name: &str,
        kind: VarKind,
    ) -> Self::Out {
        self.vars(store, base_name, kind, VarType::Integer, &(0.0..f64::INFINITY))
    }

    /// Non-negative continuous variables
    fn cont(
        &self,
        store: &mut TiVec<VarId, VariableDef>,
        base_name: &str,
        kind: VarKind,
    ) -> Self::Out {
        self.vars(store, base_name, kind, VarType::Continuous, &(0.0..f64::INFINITY))
    }
}

fn declare(
    store: &mut TiVec<VarId, VariableDef>,
    name: String,
    kind: VarKind,
    vtype: VarType,
    bounds: &Range<f64>,
) -> VarId {
    let id = VarId::from(store.len());
    store.push(VariableDef {
        name,
        kind,
        vtype,
        lower: bounds.start,
        upper: bounds.end,
    });
    id
}

impl AddVars for (usize, usize) {
    type Out = Array2<VarId>;

    fn vars(
        &self,
        store: &mut TiVec<VarId, VariableDef>,
        base_name: &str,
        kind: VarKind,
        vtype: VarType,
        bounds: &Range<f64>,
    ) -> Self::Out {
        Array2::from_shape_fn(*self, |(i, t)| {
            declare(store, format!("{}_{}_{}", base_name, i, t), kind, vtype, bounds)
        })
    }
}

impl AddVars for (usize, usize, usize) {
    type Out = Array3<VarId>;

    fn vars(
        &self,
        store: &mut TiVec<VarId, VariableDef>,
        base_name: &str,
        kind: VarKind,
        vtype: VarType,
        bounds: &Range<f64>,
    ) -> Self::Out {
        Array3::from_shape_fn(*self, |(i, j, t)| {
            let name = format!("{}_{}_{}_{}", base_name, i, j, t);
            declare(store, name, kind, vtype, bounds)
        })
    }
}

/// Converts arrays of variables into arrays of their solved values
pub trait ConvertVars {
    type Out;
    fn convert(&self, values: &TiSlice<VarId, f64>) -> Self::Out;
}

impl<D: Dimension> ConvertVars for Array<VarId, D> {
    type Out = Array<f64, D>;

    fn convert(&self, values: &TiSlice<VarId, f64>) -> Self::Out {
        self.map(|var| values[*var])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_in_row_major_order_with_indexed_names() {
        let mut store = TiVec::new();
        let a = (2, 2, 3).integer(&mut store, "A", VarKind::Transfer);
        let d = (2, 3).integer(&mut store, "D", VarKind::Idle);

        assert_eq!(store.len(), 12 + 6);
        assert_eq!(store[a[(1, 0, 2)]].name, "A_1_0_2");
        assert_eq!(store[d[(1, 2)]].name, "D_1_2");
        assert_eq!(usize::from(a[(0, 0, 1)]), 1);
        assert_eq!(usize::from(d[(0, 0)]), 12);
        assert!(store
            .iter()
            .all(|v| v.vtype == VarType::Integer && v.lower == 0.0 && v.upper.is_infinite()));
    }

    #[test]
    fn convert_reads_values_by_id() {
        let mut store = TiVec::new();
        let h = (1, 3).cont(&mut store, "H", VarKind::Backlog);
        let values: TiVec<VarId, f64> = vec![4.0, 5.0, 6.0].into();

        let solved = h.convert(&values);
        assert_eq!(solved.into_raw_vec(), vec![4.0, 5.0, 6.0]);
    }
}

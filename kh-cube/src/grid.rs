use std::fmt::Display;
use std::ops::Index;

use indexmap::IndexMap;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct isize2(pub isize, pub isize);

impl From<(isize, isize)> for isize2 { 
    fn from((i, j): (isize, isize)) -> Self {
        isize2(i, j)
    }
}

impl Display for isize2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

pub trait GridTrait<I> {
    type Itr: Iterator<Item = I>;
    type Output;

    fn support(&self) -> Self::Itr;
    fn is_supported(&self, i: I) -> bool;
    fn get(&self, i: I) -> &Self::Output;
}

/// Values on a finite set of bidegrees, with a default elsewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid2<E> {
    data: IndexMap<isize2, E>,
    dflt: E,
}

impl<E> Grid2<E>
where E: Default { 
    pub fn generate<I, F>(support: I, mut f: F) -> Self
    where I: IntoIterator<Item = isize2>, F: FnMut(isize2) -> E { 
        let data = support.into_iter().map(|i| (i, f(i))).collect();
        Self { data, dflt: E::default() }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&isize2, &E)> { 
        self.data.iter()
    }

    pub fn map<F, E2>(&self, mut f: F) -> Grid2<E2>
    where F: FnMut(&E) -> E2, E2: Default {
        Grid2::generate(self.data.keys().cloned(), |i| f(&self.data[&i]))
    }
}

impl<E> GridTrait<isize2> for Grid2<E> {
    type Itr = std::vec::IntoIter<isize2>;
    type Output = E;

    fn support(&self) -> Self::Itr { 
        self.data.keys().cloned().collect::<Vec<_>>().into_iter()
    }

    fn is_supported(&self, i: isize2) -> bool { 
        self.data.contains_key(&i)
    }

    fn get(&self, i: isize2) -> &Self::Output { 
        self.data.get(&i).unwrap_or(&self.dflt)
    }
}

impl<E> Index<isize2> for Grid2<E> {
    type Output = E;

    fn index(&self, i: isize2) -> &Self::Output { 
        self.get(i)
    }
}

impl<E> Index<(isize, isize)> for Grid2<E> {
    type Output = E;

    fn index(&self, i: (isize, isize)) -> &Self::Output { 
        self.get(i.into())
    }
}

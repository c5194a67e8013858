//! The mount hook: `did_mount` and `will_unmount` callbacks for a component's
//! root element.

use std::fmt;
use std::rc::Rc;

use trellis_core::{DomElement, NodeRef, use_commit_effect, use_ref, use_unmount};

/// The argument passed to mount callbacks: the hook props merged with the
/// root element.
#[derive(Debug, Clone)]
pub struct MountArg<P> {
    pub props: P,
    pub el: DomElement,
}

pub type MountCallback<P> = Rc<dyn Fn(&MountArg<P>)>;

/// Props for [`use_mount_hook`].
pub struct MountHookProps<P> {
    pub hook_props: P,
    pub did_mount: Option<MountCallback<P>>,
    pub will_unmount: Option<MountCallback<P>>,
    /// Receives the root element as well.
    pub el_ref: Option<NodeRef>,
}

impl<P> MountHookProps<P> {
    pub fn new(hook_props: P) -> Self {
        Self {
            hook_props,
            did_mount: None,
            will_unmount: None,
            el_ref: None,
        }
    }

    pub fn did_mount(mut self, callback: impl Fn(&MountArg<P>) + 'static) -> Self {
        self.did_mount = Some(Rc::new(callback));
        self
    }

    pub fn will_unmount(mut self, callback: impl Fn(&MountArg<P>) + 'static) -> Self {
        self.will_unmount = Some(Rc::new(callback));
        self
    }

    pub fn el_ref(mut self, node_ref: NodeRef) -> Self {
        self.el_ref = Some(node_ref);
        self
    }
}

impl<P: Default> Default for MountHookProps<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P: fmt::Debug> fmt::Debug for MountHookProps<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountHookProps")
            .field("hook_props", &self.hook_props)
            .field("did_mount", &self.did_mount.is_some())
            .field("will_unmount", &self.will_unmount.is_some())
            .field("el_ref", &self.el_ref)
            .finish()
    }
}

/// Props and callback from the most recent render, read at teardown.
struct Latest<P> {
    props: P,
    will_unmount: Option<MountCallback<P>>,
}

/// Track the component's root element and fire mount callbacks around it.
///
/// `children` receives the ref to attach to the root element. `did_mount`
/// runs once, after the first commit in which that ref holds an element and
/// after the effects queued by `children`. `will_unmount` runs once when the
/// component is torn down, while the element is still attached, and only if
/// `did_mount` was delivered. It sees the props of the latest render.
///
/// The root element is mirrored into `el_ref`. A ref dropped or replaced by a
/// later render stops receiving it and is cleared.
pub fn use_mount_hook<P, R>(props: &MountHookProps<P>, children: impl FnOnce(NodeRef) -> R) -> R
where
    P: Clone + 'static,
{
    let root_ref = use_ref(NodeRef::new).get();
    let mounted_el = use_ref(|| None::<DomElement>);
    let latest = use_ref(|| None::<Latest<P>>);
    let external = use_ref(|| None::<NodeRef>);

    let previous = external.get();
    if previous != props.el_ref {
        if let Some(old) = &previous {
            root_ref.unforward(old);
        }
        if let Some(new) = &props.el_ref {
            root_ref.forward_to(new);
        }
        external.set(props.el_ref.clone());
    }
    latest.set(Some(Latest {
        props: props.hook_props.clone(),
        will_unmount: props.will_unmount.clone(),
    }));

    let output = children(root_ref.clone());

    let (target, mounted) = (root_ref, mounted_el.clone());
    let (hook_props, did_mount) = (props.hook_props.clone(), props.did_mount.clone());
    use_commit_effect(move || {
        if mounted.borrow().is_some() {
            return;
        }
        let Some(el) = target.get() else {
            tracing::warn!("mount hook committed without a root element");
            return;
        };
        mounted.set(Some(el.clone()));
        if let Some(did_mount) = did_mount {
            did_mount(&MountArg {
                props: hook_props,
                el,
            });
        }
    });

    use_unmount(move || {
        let Some(el) = mounted_el.borrow_mut().take() else {
            return;
        };
        let Some(latest) = latest.borrow_mut().take() else {
            return;
        };
        if let Some(will_unmount) = latest.will_unmount {
            will_unmount(&MountArg {
                props: latest.props,
                el,
            });
        }
    });

    output
}
